pub mod dry;
pub mod error;
pub mod events;
pub mod state_property;
pub mod syncable_core;
pub mod syncable_type;

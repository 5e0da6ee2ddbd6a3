pub mod error;
pub mod method_kind;
pub mod method_table;

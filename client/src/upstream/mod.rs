mod error;
mod gateway;

pub use error::UpstreamError;
pub use gateway::UpstreamGateway;

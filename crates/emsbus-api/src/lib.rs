// emsbus-api: Async Rust client for the EMS bus gateway REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{IdentityResponse, StatEntry, StatusResponse};
pub use transport::{TlsMode, TransportConfig};

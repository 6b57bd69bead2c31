// opnly-api: Async Rust client for the OPNsense firewall management API

pub mod auth;
pub mod client;
pub mod error;
pub mod filter;
pub mod transport;

pub use auth::Credentials;
pub use client::{ApiResponse, OpnsenseClient};
pub use error::Error;
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};

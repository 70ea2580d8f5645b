//! Async client for the A2S_RULES query of the Source engine server query
//! protocol.

#[macro_use]
extern crate tracing;

pub mod dns;
pub mod error;
mod config;
mod packet;
mod rules;
mod server;

pub use config::*;
pub use error::QueryError;
pub use packet::*;
pub use rules::*;
pub use server::*;

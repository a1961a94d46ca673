//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands routed through ReversalService

mod client;
mod connection;
mod server;

pub use client::{AddResult, Client};
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};

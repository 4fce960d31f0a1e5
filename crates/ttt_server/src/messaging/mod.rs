//! Message handling for client-server communication.
//!
//! This module turns raw client text frames into room intents.

pub mod router;

pub use router::route_client_message;

//! HTTP surface: handlers, routing, the culler, and the server runner.

pub mod client_addr;
pub mod culler;
pub mod handlers;
pub mod listing;
pub mod router;
pub mod server;

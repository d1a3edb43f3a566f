pub mod api;
pub mod client;
pub mod rpc;
pub mod transport;

pub mod endpoints;
pub mod http_client;
pub mod transport;

pub use endpoints::Endpoints;
pub use http_client::HttpStatusClient;
pub use transport::{HttpReply, StatusTransport, TransportFailure};

#[cfg(test)]
pub use transport::MockStatusTransport;

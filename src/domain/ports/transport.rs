//! Transport ports: the upstream connection and the client reply channel.
//!
//! The wire codec lives behind these traits. The proxy core only sees the
//! decoded object model.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::errors::TransportError;
use crate::domain::models::{Controls, Request, Response};

/// Responses to one forwarded request, in arrival order. The channel closes
/// once the upstream has sent the final response (immediately for unbind).
pub type ResponseStream = mpsc::Receiver<Response>;

/// Connection to the upstream directory server, one per client connection.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send a request upstream and return the stream of its responses.
    async fn send(
        &self,
        request: Request,
        controls: Option<Controls>,
    ) -> Result<ResponseStream, TransportError>;
}

/// Reply channel back to the client.
#[async_trait]
pub trait ClientSink: Send + Sync {
    /// Deliver one response message to the client.
    async fn reply(&self, response: Response) -> Result<(), TransportError>;
}

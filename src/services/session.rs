//! Drives one client connection through its decision engine.

use tokio::sync::mpsc;
use tracing::{error, info_span, Instrument};

use crate::domain::errors::{ConnectionError, ConnectionResult, TransportError};
use crate::domain::models::{Controls, Request, Response};
use crate::domain::ports::{ClientSink, Upstream};
use crate::services::connection_engine::{ConnectionEngine, Decision};

/// Decoded request as delivered by the client-side codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub request: Request,
    pub controls: Option<Controls>,
}

impl InboundRequest {
    pub const fn new(request: Request, controls: Option<Controls>) -> Self {
        Self { request, controls }
    }
}

/// One client connection: its engine, its upstream and its reply channel.
///
/// Requests are handled strictly one after another. A forwarded request's
/// responses are all relayed before the next request is looked at.
pub struct Session<U, C> {
    engine: ConnectionEngine,
    upstream: U,
    client: C,
}

impl<U, C> Session<U, C>
where
    U: Upstream,
    C: ClientSink,
{
    pub const fn new(engine: ConnectionEngine, upstream: U, client: C) -> Self {
        Self {
            engine,
            upstream,
            client,
        }
    }

    pub const fn engine(&self) -> &ConnectionEngine {
        &self.engine
    }

    pub const fn upstream(&self) -> &U {
        &self.upstream
    }

    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Handle one request to completion.
    ///
    /// A search whose response stream ends before its terminal status is a
    /// transport failure.
    pub async fn handle(&mut self, request: Request, controls: Option<Controls>) -> ConnectionResult<()> {
        match self
            .engine
            .on_request(request, controls, &self.upstream)
            .await?
        {
            Decision::Reply(responses) => {
                for response in responses {
                    self.client.reply(response).await?;
                }
            }
            Decision::Forward { request, controls } => {
                let mut responses = self
                    .upstream
                    .send(request.clone(), controls.clone())
                    .await?;
                let mut search_done = false;
                while let Some(response) = responses.recv().await {
                    search_done |= matches!(response, Response::SearchDone(_));
                    let relay = self
                        .engine
                        .on_response(response, &request, controls.as_deref())
                        .await?;
                    self.client.reply(relay).await?;
                }
                if matches!(request, Request::Search(_)) && !search_done {
                    return Err(ConnectionError::Transport(TransportError::Closed));
                }
            }
        }
        Ok(())
    }

    /// Process inbound requests until the client side closes or a fatal
    /// error ends the connection.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<InboundRequest>) -> ConnectionResult<()> {
        let span = info_span!("connection", id = %self.engine.connection_id());
        async move {
            while let Some(InboundRequest { request, controls }) = inbound.recv().await {
                if let Err(e) = self.handle(request, controls).await {
                    error!(error = %e, "fatal connection error, closing");
                    self.engine.close();
                    return Err(e);
                }
            }
            self.engine.close();
            Ok(())
        }
        .instrument(span)
        .await
    }
}

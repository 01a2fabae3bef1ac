//! Per-connection decision engine.
//!
//! Intercepts every client request before it is forwarded and every upstream
//! response before it is relayed, and decides whether to:
//! - answer a search from the cache,
//! - swallow an anonymous bind (answered locally) and, if an unbind follows
//!   directly, the unbind as well,
//! - forward the request upstream, first sending any deferred bind.
//!
//! Search results streamed back by the upstream are relayed unchanged and
//! collected on the side; the terminal status commits them to the cache.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::{ConnectionError, ConnectionResult};
use crate::domain::models::{
    BindRequest, BindResponse, Control, Controls, Request, Response, SearchResultEntry,
};
use crate::domain::ports::Upstream;
use crate::services::search_cache::{CacheLookup, SearchCache};
use crate::services::stats::ProxyStats;

/// What to do with a client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Fully handled locally: send these messages to the client (possibly
    /// none) and do not forward anything.
    Reply(Vec<Response>),
    /// Forward this request upstream.
    Forward {
        request: Request,
        controls: Option<Controls>,
    },
}

/// Anonymous bind answered locally but not yet sent upstream.
#[derive(Debug, Clone)]
struct PendingBind {
    request: BindRequest,
    controls: Option<Controls>,
}

/// Mutable state of one connection. Never shared between connections.
#[derive(Debug, Default)]
pub struct ConnectionState {
    pending_bind: Option<PendingBind>,
    search_results: Vec<SearchResultEntry>,
}

impl ConnectionState {
    pub const fn has_pending_bind(&self) -> bool {
        self.pending_bind.is_some()
    }

    pub fn accumulated_results(&self) -> usize {
        self.search_results.len()
    }
}

/// Decision engine owned by exactly one connection.
pub struct ConnectionEngine {
    connection_id: Uuid,
    cache: Arc<SearchCache>,
    state: ConnectionState,
}

impl ConnectionEngine {
    pub fn new(cache: Arc<SearchCache>) -> Self {
        Self::with_id(Uuid::new_v4(), cache)
    }

    pub fn with_id(connection_id: Uuid, cache: Arc<SearchCache>) -> Self {
        debug!(connection = %connection_id, "connection opened");
        Self {
            connection_id,
            cache,
            state: ConnectionState::default(),
        }
    }

    pub const fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub const fn state(&self) -> &ConnectionState {
        &self.state
    }

    fn stats(&self) -> &ProxyStats {
        self.cache.stats()
    }

    /// Decide what to do with a client request before it is forwarded.
    ///
    /// If a deferred bind has to be flushed, it is sent through `upstream`
    /// and its response awaited before this returns `Forward`.
    pub async fn on_request<U>(
        &mut self,
        request: Request,
        controls: Option<Controls>,
        upstream: &U,
    ) -> ConnectionResult<Decision>
    where
        U: Upstream + ?Sized,
    {
        debug!(
            connection = %self.connection_id,
            kind = request.kind(),
            request = ?request,
            controls = ?controls,
            "request before forward"
        );

        match request {
            Request::Bind(bind) => {
                if self.state.pending_bind.is_some() {
                    return Err(ConnectionError::BindAlreadyPending);
                }
                if !bind.is_anonymous() {
                    return Ok(Decision::Forward {
                        request: Request::Bind(bind),
                        controls,
                    });
                }

                debug!(connection = %self.connection_id, bind = %bind, "deferring anonymous bind");
                self.state.pending_bind = Some(PendingBind {
                    request: bind,
                    controls,
                });
                Ok(Decision::Reply(vec![Response::Bind(BindResponse::success())]))
            }
            Request::Unbind => {
                if self.state.pending_bind.take().is_some() {
                    self.stats().record_bind_avoided();
                    info!(
                        connection = %self.connection_id,
                        "anonymous bind/unbind pair answered locally, upstream round trip avoided"
                    );
                    return Ok(Decision::Reply(Vec::new()));
                }
                self.stats().record_unbind_forwarded();
                info!(
                    connection = %self.connection_id,
                    "unbind without deferred bind, forwarding"
                );
                Ok(Decision::Forward {
                    request: Request::Unbind,
                    controls,
                })
            }
            Request::Search(search) => {
                if let CacheLookup::Hit(cached) =
                    self.cache.lookup(&search, controls.as_deref()).await
                {
                    let mut replies: Vec<Response> = cached
                        .entries
                        .iter()
                        .cloned()
                        .map(Response::SearchEntry)
                        .collect();
                    replies.push(Response::SearchDone(cached.done.clone()));
                    return Ok(Decision::Reply(replies));
                }
                // Entries left over from a search that never completed
                // must not leak into this one.
                self.state.search_results.clear();
                self.forward(Request::Search(search), controls, upstream)
                    .await
            }
            other => self.forward(other, controls, upstream).await,
        }
    }

    async fn forward<U>(
        &mut self,
        request: Request,
        controls: Option<Controls>,
        upstream: &U,
    ) -> ConnectionResult<Decision>
    where
        U: Upstream + ?Sized,
    {
        if let Some(pending) = self.state.pending_bind.take() {
            self.flush_bind(pending, upstream).await?;
        }
        Ok(Decision::Forward { request, controls })
    }

    /// Send the deferred bind upstream and wait until it is accepted.
    async fn flush_bind<U>(&self, pending: PendingBind, upstream: &U) -> ConnectionResult<()>
    where
        U: Upstream + ?Sized,
    {
        info!(
            connection = %self.connection_id,
            bind = %pending.request,
            "flushing deferred bind upstream"
        );

        let mut responses = upstream
            .send(Request::Bind(pending.request), pending.controls)
            .await?;

        match responses.recv().await {
            Some(Response::Bind(response)) if response.result.is_success() => {
                self.stats().record_bind_flushed();
                Ok(())
            }
            Some(Response::Bind(response)) => Err(ConnectionError::BindRejected {
                code: response.result.code,
                message: response.result.diagnostic_message,
            }),
            Some(other) => Err(ConnectionError::UnexpectedBindResponse(other.kind())),
            None => Err(ConnectionError::MissingBindResponse),
        }
    }

    /// Inspect a response to a forwarded request and return what to relay.
    ///
    /// Responses are relayed unchanged. For searches, entries are collected
    /// as they pass and committed to the cache on the terminal status.
    pub async fn on_response(
        &mut self,
        response: Response,
        request: &Request,
        controls: Option<&[Control]>,
    ) -> ConnectionResult<Response> {
        debug!(
            connection = %self.connection_id,
            kind = response.kind(),
            request = request.kind(),
            "proxied response"
        );

        let Request::Search(search) = request else {
            return Ok(response);
        };

        match &response {
            Response::SearchEntry(entry) => {
                self.state.search_results.push(entry.clone());
            }
            Response::SearchDone(done) => {
                let entries = std::mem::take(&mut self.state.search_results);
                self.cache.put_search(search, controls, entries, done).await;
            }
            Response::Bind(_) | Response::Other(_) => {
                return Err(ConnectionError::UnexpectedSearchResponse(response.kind()));
            }
        }
        Ok(response)
    }

    /// Tear down the connection state.
    pub fn close(self) {
        debug!(
            connection = %self.connection_id,
            pending_bind = self.state.has_pending_bind(),
            buffered_results = self.state.accumulated_results(),
            "connection closed"
        );
    }
}

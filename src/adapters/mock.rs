//! In-process transport doubles for testing.
//!
//! `ScriptedUpstream` plays the directory server: it records every request it
//! receives and answers from a script. `RecordingClient` collects what the
//! proxy sends back to the client.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::domain::errors::TransportError;
use crate::domain::models::{
    BindResponse, Controls, LdapResult, OpaqueMessage, Request, Response,
};
use crate::domain::ports::{ClientSink, ResponseStream, Upstream};

/// Scripted upstream directory server.
pub struct ScriptedUpstream {
    sent: Arc<Mutex<Vec<(Request, Option<Controls>)>>>,
    bind_responses: Vec<Response>,
    search_responses: Arc<RwLock<HashMap<String, Vec<Response>>>>,
    failure: Option<TransportError>,
}

impl ScriptedUpstream {
    /// Upstream that accepts every bind and returns empty successful searches.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            bind_responses: vec![Response::Bind(BindResponse::success())],
            search_responses: Arc::new(RwLock::new(HashMap::new())),
            failure: None,
        }
    }

    /// Answer every bind with `response`.
    #[must_use]
    pub fn with_bind_response(self, response: Response) -> Self {
        self.with_bind_responses(vec![response])
    }

    /// Answer every bind with exactly `responses`; an empty list closes the
    /// stream without any answer.
    #[must_use]
    pub fn with_bind_responses(mut self, responses: Vec<Response>) -> Self {
        self.bind_responses = responses;
        self
    }

    /// Fail every send with `error`.
    #[must_use]
    pub fn failing(mut self, error: TransportError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Answer searches whose filter renders to `filter_text` with `responses`.
    pub async fn set_search_responses(&self, filter_text: impl Into<String>, responses: Vec<Response>) {
        let mut scripts = self.search_responses.write().await;
        scripts.insert(filter_text.into(), responses);
    }

    /// Every request received so far, in order.
    pub async fn sent(&self) -> Vec<(Request, Option<Controls>)> {
        self.sent.lock().await.clone()
    }

    async fn script_for(&self, request: &Request) -> Vec<Response> {
        match request {
            Request::Bind(_) => self.bind_responses.clone(),
            Request::Unbind => Vec::new(),
            Request::Search(search) => {
                let scripts = self.search_responses.read().await;
                scripts
                    .get(&search.filter.as_text())
                    .cloned()
                    .unwrap_or_else(|| vec![Response::SearchDone(LdapResult::success())])
            }
            Request::Other(message) => vec![Response::Other(OpaqueMessage {
                tag: message.tag.saturating_add(1),
                payload: Vec::new(),
            })],
        }
    }
}

impl Default for ScriptedUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn send(
        &self,
        request: Request,
        controls: Option<Controls>,
    ) -> Result<ResponseStream, TransportError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let responses = self.script_for(&request).await;
        self.sent.lock().await.push((request, controls));

        let (tx, rx) = mpsc::channel(responses.len().max(1));
        for response in responses {
            tx.try_send(response).map_err(|_| TransportError::Closed)?;
        }
        Ok(rx)
    }
}

/// Client sink that records every reply.
#[derive(Clone, Default)]
pub struct RecordingClient {
    replies: Arc<Mutex<Vec<Response>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reply delivered so far, in order.
    pub async fn replies(&self) -> Vec<Response> {
        self.replies.lock().await.clone()
    }
}

#[async_trait]
impl ClientSink for RecordingClient {
    async fn reply(&self, response: Response) -> Result<(), TransportError> {
        self.replies.lock().await.push(response);
        Ok(())
    }
}

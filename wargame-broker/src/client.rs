//! HTTP broker client
//!
//! Blocking wrapper around `reqwest` so the synchronous game loop can talk
//! to the relay. Requests run on a private single-threaded runtime.

use reqwest::StatusCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use wargame_core::{BrokerError, BrokerMove, BrokerReply, MoveBroker};

/// Per-request ceiling
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// `MoveBroker` over the relay's HTTP API
pub struct HttpBroker {
    url: String,
    client: reqwest::Client,
    runtime: Runtime,
}

impl HttpBroker {
    /// Must not be called from inside an async context
    pub fn new(url: impl Into<String>) -> Result<Self, BrokerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BrokerError::Transport(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
            runtime,
        })
    }

    async fn post(&self, mv: &BrokerMove) -> Result<BrokerReply, BrokerError> {
        let response = self
            .client
            .post(&self.url)
            .json(mv)
            .send()
            .await
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        read_reply(response).await
    }

    async fn get(&self) -> Result<BrokerReply, BrokerError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        read_reply(response).await
    }
}

async fn read_reply(response: reqwest::Response) -> Result<BrokerReply, BrokerError> {
    if response.status() != StatusCode::OK {
        return Err(BrokerError::Status(response.status().as_u16()));
    }
    response
        .json::<BrokerReply>()
        .await
        .map_err(|e| BrokerError::Decode(e.to_string()))
}

impl MoveBroker for HttpBroker {
    fn submit(&mut self, mv: &BrokerMove) -> Result<(), BrokerError> {
        let reply = self.runtime.block_on(self.post(mv))?;
        if reply.success && reply.data.as_ref() == Some(mv) {
            Ok(())
        } else {
            Err(BrokerError::Mismatch)
        }
    }

    fn poll(&mut self) -> Result<Option<BrokerMove>, BrokerError> {
        let reply = self.runtime.block_on(self.get())?;
        Ok(if reply.success { reply.data } else { None })
    }
}

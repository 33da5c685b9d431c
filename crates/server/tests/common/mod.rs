//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, backed by a
//! `MockSessionProvider` instead of a MySQL server, and shuts it down
//! gracefully when dropped.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use sqlgate_server::{config::AppConfig, router::create_router, state::AppState};
use sqlgate_test_utils::{setup_tracing, MockSessionProvider};
use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_API_KEY: &str = "test-secret-key";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub provider: MockSessionProvider,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server with [`TEST_API_KEY`] and no deadline.
    pub async fn spawn(provider: MockSessionProvider) -> Result<Self> {
        let config = AppConfig {
            api_key: TEST_API_KEY.to_string(),
            ..Default::default()
        };
        Self::spawn_with_config(provider, config).await
    }

    pub async fn spawn_with_config(
        provider: MockSessionProvider,
        config: AppConfig,
    ) -> Result<Self> {
        setup_tracing();

        let app_state = AppState::new(config, Box::new(provider.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            provider,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// An authorized `GET`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(TEST_API_KEY)
    }

    /// An authorized `POST` with a JSON body.
    pub fn post_json(&self, path: &str, body: &Value) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(TEST_API_KEY)
            .json(body)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // The receiver is gone if the server task already stopped.
            let _ = tx.send(());
        }
    }
}

/// Status plus parsed JSON body.
pub async fn json_of(response: Response) -> Result<(reqwest::StatusCode, Value)> {
    let status = response.status();
    let body = response.json::<Value>().await?;
    Ok((status, body))
}

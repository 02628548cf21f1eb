//! Read-only proxy to the third-party positions listing.

use std::time::Duration;

use axum::http::StatusCode;
use platform_api::ApiError;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};

pub const DEFAULT_POSITIONS_URL: &str = "https://ibillboard.com/api/positions";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("positions service unreachable")]
    Transport(#[source] reqwest::Error),
    #[error("positions service responded with {0}")]
    Status(StatusCode),
    #[error("positions service returned an invalid body")]
    Decode(#[source] reqwest::Error),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::Status(status) => *status,
            GatewayError::Transport(_) | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError::Upstream {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PositionsGateway {
    client: reqwest::Client,
    url: String,
}

impl PositionsGateway {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .user_agent(concat!("hr-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetches the upstream JSON document and returns it unchanged.
    #[instrument(name = "positions.fetch", skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "positions upstream unreachable");
                GatewayError::Transport(err)
            })?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "positions upstream failed");
            return Err(GatewayError::Status(status));
        }
        response.json::<Value>().await.map_err(GatewayError::Decode)
    }
}

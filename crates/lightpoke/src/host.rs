// ── WLED JSON API host ──
//
// Drives a WLED-style controller over its `/json/state` endpoint. Saving
// uses `psave` with brightness and segment bounds included so the preset
// captures the full state; applying a preset uses `ps`; a pushed state
// document is posted as-is.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use lightpoke_api::transport::TransportConfig;
use lightpoke_core::{CoreError, Host};

use crate::error::CliError;

const STATE_PATH: &str = "json/state";

pub struct WledHost {
    client: reqwest::Client,
    state_url: Url,
    request_timeout: Duration,
}

impl WledHost {
    pub fn new(device_url: &Url, transport: &TransportConfig) -> Result<Self, CliError> {
        let state_url = device_url.join(STATE_PATH).map_err(|e| CliError::Validation {
            field: "device.url".into(),
            reason: e.to_string(),
        })?;
        let client = transport.build_client()?;

        Ok(Self {
            client,
            state_url,
            request_timeout: transport.request_timeout,
        })
    }

    async fn post_state(&self, body: &Value) -> Result<(), CoreError> {
        trace!(url = %self.state_url, body = %body, "posting device state");

        let resp = self
            .client
            .post(self.state_url.clone())
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::host(format!("{}: {e}", self.state_url)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::host(format!(
                "{} returned HTTP {}",
                self.state_url,
                status.as_u16()
            )));
        }
        Ok(())
    }
}

impl Host for WledHost {
    async fn save_preset(&mut self, id: u8, label: &str) -> Result<(), CoreError> {
        debug!(preset = id, "saving restore preset");
        self.post_state(&json!({ "psave": id, "n": label, "ib": true, "sb": true }))
            .await
    }

    async fn apply_preset(&mut self, id: u8) -> Result<(), CoreError> {
        debug!(preset = id, "applying preset");
        self.post_state(&json!({ "ps": id })).await
    }

    async fn apply_state(&mut self, state: &Value) -> Result<(), CoreError> {
        self.post_state(state).await
    }
}

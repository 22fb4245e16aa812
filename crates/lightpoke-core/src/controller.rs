// ── LightPoke controller ──
//
// The usermod shell. Owns the config, the session, the supervisor and the
// poke handler, and exposes the host hooks: setup, network-up, tick, and
// the JSON config/state/info round-trips. One instance, driven from one
// task; nothing here is shared.

use std::time::Duration;

use serde_json::{Map, Value, json};
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use lightpoke_api::protocol;
use lightpoke_api::{Method, ServerEndpoint, sanitize_server_url};

use crate::config::{ClientConfig, Tuning};
use crate::host::Host;
use crate::poke::{LineOutcome, PendingPoke, PokeHandler};
use crate::session::PokeSession;
use crate::supervisor::{ConnectionState, Supervisor, Verdict};

/// Key of this module's object in the host's JSON documents.
pub const SECTION: &str = "LightPoke";

const KEY_ENABLED: &str = "enabled";
const KEY_API_KEY: &str = "apiKey";
const KEY_SERVER: &str = "server";
const KEY_INTERVAL: &str = "interval";
const KEY_CONNECTED: &str = "connected";
const KEY_POKE: &str = "poke";

/// The LightPoke client, generic over its transport and its host.
pub struct LightPoke<S, H> {
    config: ClientConfig,
    endpoint: ServerEndpoint,
    session: S,
    host: H,
    supervisor: Supervisor,
    poke: PokeHandler,
    session_timeout: Duration,
    init_done: bool,
    trigger_requested: bool,
    reconnect_requested: bool,
}

impl<S: PokeSession, H: Host> LightPoke<S, H> {
    /// Build a controller. Does not connect; call [`setup`](Self::setup)
    /// and then drive [`tick`](Self::tick).
    pub fn new(mut config: ClientConfig, tuning: Tuning, session: S, host: H) -> Self {
        config.server_url = sanitize_server_url(&config.server_url);
        let endpoint = ServerEndpoint::parse(&config.server_url);

        Self {
            config,
            endpoint,
            session,
            host,
            supervisor: Supervisor::new(tuning.supervisor),
            poke: PokeHandler::new(tuning.restore_preset_id),
            session_timeout: tuning.session_timeout,
            init_done: false,
            trigger_requested: false,
            reconnect_requested: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn pending_poke(&self) -> &PendingPoke {
        self.poke.pending()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn enable(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState {
            is_open: self.session.is_open(),
            consecutive_failures: self.supervisor.consecutive_failures(),
            last_failure: self.supervisor.last_failure(),
        }
    }

    fn is_runnable(&self) -> bool {
        self.init_done && self.config.enabled && !self.config.api_key.is_empty()
    }

    // ── Lifecycle hooks ──────────────────────────────────────────

    /// One-time initialisation after construction.
    pub fn setup(&mut self) {
        self.endpoint = ServerEndpoint::parse(&self.config.server_url);
        self.init_done = true;
        debug!(endpoint = %self.endpoint, "lightpoke set up");
    }

    /// The network came (back) up: open and subscribe right away.
    pub async fn on_network_up(&mut self) {
        if !self.is_runnable() {
            return;
        }
        self.reconnect().await;
    }

    /// One cooperative step. Never blocks beyond a bounded connection
    /// attempt.
    pub async fn tick(&mut self, now: Instant) {
        if !self.is_runnable() || self.host.is_busy() {
            return;
        }

        let trigger = std::mem::take(&mut self.trigger_requested);
        let reconnect = std::mem::take(&mut self.reconnect_requested);
        if trigger {
            self.trigger_poke().await;
        } else if reconnect {
            self.reconnect().await;
        }

        self.poke.service(now, &mut self.host).await;

        if let Some(line) = self.session.poll_line() {
            self.supervisor.record_line();
            if self.poke.on_line(&line, now, &mut self.host).await == LineOutcome::Accepted {
                debug!("poke window open");
            }
        } else if self.supervisor.record_silence(now) == Verdict::Reconnect {
            info!(endpoint = %self.endpoint, "poke stream silent, reconnecting");
            self.reconnect().await;
        }
    }

    async fn reconnect(&mut self) {
        // This reconnect already picks up any pending server/key change.
        self.reconnect_requested = false;
        self.supervisor.reset();

        if let Err(e) = self.session.open(&self.endpoint) {
            warn!(error = %e, endpoint = %self.endpoint, "opening poke session failed");
            return;
        }
        match timeout(
            self.session_timeout,
            self.session.send_subscribe(&self.config.api_key),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, endpoint = %self.endpoint, "subscribing to poke stream failed");
            }
            Err(_) => {
                warn!(endpoint = %self.endpoint, "subscribing to poke stream timed out");
                self.session.close();
            }
        }
    }

    /// Send the fire-and-forget trigger, then bring the stream back.
    ///
    /// The stream and the trigger cannot share the transport, so the
    /// stream is always closed first and always re-established after.
    async fn trigger_poke(&mut self) {
        self.session.close();

        match self.session.open(&self.endpoint) {
            Ok(()) => {
                let path = protocol::poke_path(&self.config.api_key);
                let request = self.session.send_one_shot(Method::POST, &path);
                match timeout(self.session_timeout, request).await {
                    Ok(Ok(())) => info!("poke triggered"),
                    Ok(Err(e)) => warn!(error = %e, "poke trigger failed"),
                    Err(_) => warn!("poke trigger timed out"),
                }
            }
            Err(e) => warn!(error = %e, endpoint = %self.endpoint, "opening trigger connection failed"),
        }

        self.reconnect().await;
    }

    // ── Config and state hooks ───────────────────────────────────

    /// Accept a server URL from any untrusted path.
    fn set_server_url(&mut self, candidate: &str) {
        let accepted = sanitize_server_url(candidate);
        if accepted == self.config.server_url {
            return;
        }
        self.config.server_url = accepted;
        self.endpoint = ServerEndpoint::parse(&self.config.server_url);
        self.reconnect_requested = true;
    }

    fn set_api_key(&mut self, api_key: &str) {
        if api_key == self.config.api_key {
            return;
        }
        api_key.clone_into(&mut self.config.api_key);
        self.reconnect_requested = true;
    }

    /// Read persisted settings. Returns `false` if the section or any
    /// key was missing; missing keys keep their current values.
    pub fn read_config(&mut self, root: &Value) -> bool {
        let Some(section) = root.get(SECTION).and_then(Value::as_object) else {
            return false;
        };
        let mut complete = true;

        match section.get(KEY_ENABLED).and_then(Value::as_bool) {
            Some(enabled) => self.config.enabled = enabled,
            None => complete = false,
        }
        match section.get(KEY_API_KEY).and_then(Value::as_str) {
            Some(api_key) => self.set_api_key(api_key),
            None => complete = false,
        }
        match section.get(KEY_SERVER).and_then(Value::as_str) {
            Some(server) => self.set_server_url(server),
            None => complete = false,
        }

        complete
    }

    /// Write persisted settings, replacing any existing section.
    pub fn write_config(&self, root: &mut Map<String, Value>) {
        root.insert(
            SECTION.to_owned(),
            json!({
                KEY_ENABLED: self.config.enabled,
                KEY_API_KEY: self.config.api_key,
                KEY_SERVER: self.config.server_url,
            }),
        );
    }

    /// Expose live settings in the host's state document.
    pub fn add_to_json_state(&self, root: &mut Map<String, Value>) {
        if !self.init_done || !self.config.enabled {
            return;
        }

        let interval_ms = self.supervisor.config().failure_interval.as_millis();
        let mut section = take_section(root);
        section.insert(KEY_SERVER.into(), Value::from(self.config.server_url.as_str()));
        section.insert(
            KEY_INTERVAL.into(),
            Value::from(u64::try_from(interval_ms).unwrap_or(u64::MAX)),
        );
        section.insert(KEY_API_KEY.into(), Value::from(self.config.api_key.as_str()));
        root.insert(SECTION.to_owned(), Value::Object(section));
    }

    /// Expose connection status in the host's runtime-info document.
    pub fn add_to_json_info(&self, root: &mut Map<String, Value>) {
        let status = if self.session.is_open() {
            "Connected"
        } else {
            "Disconnected"
        };

        let mut section = take_section(root);
        section.insert(KEY_SERVER.into(), Value::from(self.config.server_url.as_str()));
        section.insert(KEY_API_KEY.into(), Value::from(self.config.api_key.as_str()));
        section.insert(KEY_CONNECTED.into(), Value::from(status));
        root.insert(SECTION.to_owned(), Value::Object(section));
    }

    /// Apply a live state patch: `{server, apiKey, poke}`.
    ///
    /// Network work is deferred to the next tick.
    pub fn read_from_json_state(&mut self, root: &Value) {
        if !self.init_done || !self.config.enabled {
            return;
        }
        let Some(section) = root.get(SECTION).and_then(Value::as_object) else {
            return;
        };

        if let Some(server) = section.get(KEY_SERVER).and_then(Value::as_str) {
            self.set_server_url(server);
        }
        if let Some(api_key) = section.get(KEY_API_KEY).and_then(Value::as_str) {
            self.set_api_key(api_key);
        }
        if section.get(KEY_POKE).and_then(Value::as_bool) == Some(true) {
            self.trigger_requested = true;
        }
    }
}

/// Pull this module's object out of `root`, or start a fresh one.
fn take_section(root: &mut Map<String, Value>) -> Map<String, Value> {
    match root.remove(SECTION) {
        Some(Value::Object(section)) => section,
        _ => Map::new(),
    }
}

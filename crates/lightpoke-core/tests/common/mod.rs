// Scripted session and host shared by the controller tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use lightpoke_api::{Method, ServerEndpoint};
use lightpoke_core::{ClientConfig, CoreError, Host, LightPoke, PokeSession, Tuning};

// ── Session ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Open(String),
    Subscribe(String),
    OneShot(String, String),
    Close,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub calls: Vec<SessionCall>,
    pub lines: VecDeque<String>,
    pub open: bool,
    pub fail_open: bool,
    pub fail_subscribe: bool,
    /// `send_subscribe` never resolves.
    pub stall_subscribe: bool,
}

/// A session whose lines are fed by the test through a shared handle.
#[derive(Debug, Clone, Default)]
pub struct FakeSession {
    pub state: Arc<Mutex<SessionState>>,
}

impl FakeSession {
    pub fn push_line(&self, line: &str) {
        self.state.lock().unwrap().lines.push_back(line.to_owned());
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state.lock().unwrap().fail_open = fail;
    }

    pub fn set_stall_subscribe(&self, stall: bool) {
        self.state.lock().unwrap().stall_subscribe = stall;
    }

    pub fn count(&self, pred: impl Fn(&SessionCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl PokeSession for FakeSession {
    fn open(&mut self, endpoint: &ServerEndpoint) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SessionCall::Open(endpoint.to_string()));
        state.open = false;
        if state.fail_open {
            return Err(CoreError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: "refused".into(),
            });
        }
        Ok(())
    }

    async fn send_subscribe(&mut self, api_key: &str) -> Result<(), CoreError> {
        let stall = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(SessionCall::Subscribe(api_key.to_owned()));
            state.stall_subscribe
        };
        if stall {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_subscribe {
            return Err(CoreError::Rejected {
                status: 404,
                path: format!("/api/device/{api_key}/poke/stream"),
            });
        }
        state.open = true;
        Ok(())
    }

    async fn send_one_shot(&mut self, method: Method, path: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(SessionCall::OneShot(method.as_str().to_owned(), path.to_owned()));
        Ok(())
    }

    fn poll_line(&mut self) -> Option<String> {
        self.state.lock().unwrap().lines.pop_front()
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SessionCall::Close);
        state.open = false;
    }
}

// ── Host ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SavePreset(u8, String),
    InvalidateCache,
    ApplyPreset(u8),
    ApplyState(Value),
}

#[derive(Debug, Default)]
pub struct HostState {
    pub calls: Vec<HostCall>,
    pub busy: bool,
    pub fail_save: bool,
    pub fail_restore: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    pub state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn set_busy(&self, busy: bool) {
        self.state.lock().unwrap().busy = busy;
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.state.lock().unwrap().fail_save = fail;
    }

    pub fn set_fail_restore(&self, fail: bool) {
        self.state.lock().unwrap().fail_restore = fail;
    }

    pub fn count(&self, pred: impl Fn(&HostCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl Host for FakeHost {
    fn is_busy(&self) -> bool {
        self.state.lock().unwrap().busy
    }

    async fn save_preset(&mut self, id: u8, label: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_save {
            return Err(CoreError::host("preset storage full"));
        }
        state.calls.push(HostCall::SavePreset(id, label.to_owned()));
        Ok(())
    }

    fn invalidate_preset_cache(&mut self) {
        self.state.lock().unwrap().calls.push(HostCall::InvalidateCache);
    }

    async fn apply_preset(&mut self, id: u8) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::ApplyPreset(id));
        if state.fail_restore {
            return Err(CoreError::host("preset missing"));
        }
        Ok(())
    }

    async fn apply_state(&mut self, value: &Value) -> Result<(), CoreError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(HostCall::ApplyState(value.clone()));
        Ok(())
    }
}

// ── Builders ────────────────────────────────────────────────────────

pub fn client_config(api_key: &str) -> ClientConfig {
    ClientConfig {
        api_key: api_key.to_owned(),
        ..ClientConfig::default()
    }
}

/// A set-up controller plus handles to its fakes.
pub fn controller(
    config: ClientConfig,
) -> (LightPoke<FakeSession, FakeHost>, FakeSession, FakeHost) {
    let session = FakeSession::default();
    let host = FakeHost::default();
    let mut lp = LightPoke::new(config, Tuning::default(), session.clone(), host.clone());
    lp.setup();
    (lp, session, host)
}

pub fn poke_line(sustain_secs: f64, state: &Value) -> String {
    format!(r#"data: {{"type":"poke","sustainS":{sustain_secs},"state":{state}}}"#)
}

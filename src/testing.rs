//! Shared fakes for unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use serenity::all::{ApplicationId, Http, HttpBuilder, UserId};
use serenity::async_trait;

use crate::{
    config::{Config, Paths},
    error::AppError,
    model::{
        interaction::{CommandReply, Invocation},
        message::IncomingMessage,
    },
    module::{registry::ModuleRegistry, Command, Manifest, MessageHandler, ModuleContext, Task},
    service::twitch::{StreamInfo, StreamStatusProvider},
    state::{AppState, Services},
};

/// Creates a Discord REST client that sends every request to `proxy_url`.
///
/// Request paths keep their `/api/v10` prefix.
pub fn proxy_http(proxy_url: &str) -> Arc<Http> {
    Arc::new(
        HttpBuilder::new("fake-token")
            .proxy(proxy_url)
            .ratelimiter_disabled(true)
            .application_id(ApplicationId::new(1))
            .build(),
    )
}

/// Stream status source answering from a fixed map. Unknown logins are offline.
#[derive(Default)]
pub struct FakeStreams {
    pub live: HashMap<String, StreamInfo>,
    pub failing: Vec<String>,
}

#[async_trait]
impl StreamStatusProvider for FakeStreams {
    async fn stream_status(&self, login: &str) -> Result<Option<StreamInfo>, AppError> {
        if self.failing.iter().any(|failing| failing == login) {
            return Err(AppError::InternalError(format!("stream lookup failed for {}", login)));
        }
        Ok(self.live.get(login).cloned())
    }
}

pub fn services(streams: FakeStreams) -> Services {
    Services {
        http_client: reqwest::Client::new(),
        streams: Arc::new(streams),
        replay_parser: None,
        map_renderer: None,
    }
}

/// Builds application state from a config document and a test directory.
pub fn test_state(
    config: &Value,
    root: &Path,
    registry: ModuleRegistry,
    services: Services,
) -> AppState {
    let config = Config::parse(&config.to_string()).unwrap();
    let paths = Paths {
        config: root.join("config"),
        cache: root.join("cache"),
    };
    AppState::new(config, paths, registry, services)
}

/// User ID the bot runs as in tests.
pub const BOT_USER_ID: u64 = 900;

pub fn test_context(state: AppState, http: Arc<Http>) -> ModuleContext {
    ModuleContext::new(state, http, UserId::new(BOT_USER_ID))
}

/// Outcome a fake module produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Fail,
    Panic,
}

/// Command returning a fixed reply, counting its executions.
pub struct FakeCommand {
    pub manifest: Option<Manifest>,
    pub outcome: Outcome,
    pub calls: Arc<AtomicUsize>,
}

impl FakeCommand {
    pub fn named(name: &str) -> Self {
        Self {
            manifest: Some(Manifest::new(name, format!("The {} command", name))),
            outcome: Outcome::Ok,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            outcome: Outcome::Fail,
            ..Self::named(name)
        }
    }
}

#[async_trait]
impl Command for FakeCommand {
    fn manifest(&self) -> Option<Manifest> {
        self.manifest.clone()
    }

    async fn execute(
        &self,
        invocation: &Invocation,
        _ctx: &ModuleContext,
    ) -> Result<CommandReply, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Ok => Ok(CommandReply::text(format!("ran {}", invocation.command_name))),
            Outcome::Fail => Err(AppError::InternalError("command failed".to_string())),
            Outcome::Panic => panic!("command panicked"),
        }
    }
}

/// Message handler with a fixed `applies` answer, recording handled messages.
pub struct FakeHandler {
    pub manifest: Option<Manifest>,
    /// `None` makes `applies` fail.
    pub applies: Option<bool>,
    pub outcome: Outcome,
    pub applies_calls: Arc<AtomicUsize>,
    pub handled: Arc<Mutex<Vec<String>>>,
}

impl FakeHandler {
    pub fn new(name: &str, applies: Option<bool>, outcome: Outcome) -> Self {
        Self {
            manifest: Some(Manifest::new(name, format!("The {} handler", name))),
            applies,
            outcome,
            applies_calls: Arc::new(AtomicUsize::new(0)),
            handled: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl MessageHandler for FakeHandler {
    fn manifest(&self) -> Option<Manifest> {
        self.manifest.clone()
    }

    async fn applies(
        &self,
        _message: &IncomingMessage,
        _ctx: &ModuleContext,
    ) -> Result<bool, AppError> {
        self.applies_calls.fetch_add(1, Ordering::SeqCst);
        self.applies
            .ok_or_else(|| AppError::InternalError("applies failed".to_string()))
    }

    async fn handle(
        &self,
        message: &IncomingMessage,
        _ctx: &ModuleContext,
    ) -> Result<(), AppError> {
        self.handled.lock().unwrap().push(message.content.clone());
        match self.outcome {
            Outcome::Ok => Ok(()),
            Outcome::Fail => Err(AppError::InternalError("handle failed".to_string())),
            Outcome::Panic => panic!("handler panicked"),
        }
    }
}

/// Task recording the cycle numbers it was run with.
pub struct FakeTask {
    pub manifest: Option<Manifest>,
    /// Cycles that fail instead of succeeding.
    pub failing_cycles: Vec<u64>,
    pub panicking_cycles: Vec<u64>,
    /// Simulated work per cycle.
    pub work: Duration,
    pub runs: Arc<Mutex<Vec<(u64, tokio::time::Instant)>>>,
}

impl FakeTask {
    pub fn new(name: &str, interval: Duration, run_on_startup: bool) -> Self {
        let mut manifest = Manifest::new(name, format!("The {} task", name)).every(interval);
        if run_on_startup {
            manifest = manifest.on_startup();
        }
        Self {
            manifest: Some(manifest),
            failing_cycles: Vec::new(),
            panicking_cycles: Vec::new(),
            work: Duration::ZERO,
            runs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn cycles(&self) -> Vec<u64> {
        self.runs.lock().unwrap().iter().map(|(cycle, _)| *cycle).collect()
    }
}

#[async_trait]
impl Task for FakeTask {
    fn manifest(&self) -> Option<Manifest> {
        self.manifest.clone()
    }

    async fn run(&self, cycle: u64, _ctx: &ModuleContext) -> Result<(), AppError> {
        self.runs.lock().unwrap().push((cycle, tokio::time::Instant::now()));
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        if self.panicking_cycles.contains(&cycle) {
            panic!("task panicked in cycle {}", cycle);
        }
        if self.failing_cycles.contains(&cycle) {
            return Err(AppError::InternalError(format!("cycle {} failed", cycle)));
        }
        Ok(())
    }
}

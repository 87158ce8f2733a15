//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`huddle_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use huddle_app::{App, AppEvent, DetailsSource, Driver, Runtime};

use crate::{
    SimMediaServer,
    invariants::{InvariantRegistry, SystemSnapshot},
};

/// Upper bound on event loop cycles in [`run_until_quiet`].
pub const MAX_CYCLES: usize = 10_000;

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    renders: usize,
    last_snapshot: Option<SystemSnapshot>,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`huddle_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
/// Every render captures a [`SystemSnapshot`] and, when a registry is
/// attached, checks it.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
    server: Option<SimMediaServer>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), invariants: None, server: None }
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Report open sessions from `server` in snapshots.
    #[must_use]
    pub fn with_server(mut self, server: SimMediaServer) -> Self {
        self.server = Some(server);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a tick event.
    pub fn inject_tick(&self) {
        self.inject_event(AppEvent::Tick);
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.lock().renders
    }

    /// Snapshot captured by the last render.
    pub fn last_snapshot(&self) -> Option<SystemSnapshot> {
        self.lock().last_snapshot.clone()
    }

    /// Create a snapshot from App state for invariant checking.
    pub fn snapshot_from_app(&self, app: &App) -> SystemSnapshot {
        let open = self.server.as_ref().map_or(0, SimMediaServer::open_sessions);
        SystemSnapshot::from_app(app).with_open_sessions(open)
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(registry) = &self.invariants {
            let snapshot = self.snapshot_from_app(app);
            registry.assert_all(&snapshot, context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let event = self.lock().pending_events.pop_front();
        if event.is_none() {
            tokio::task::yield_now().await;
        }
        Ok(event)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let snapshot = self.snapshot_from_app(app);
        let renders = {
            let mut state = self.lock();
            state.renders += 1;
            state.last_snapshot = Some(snapshot.clone());
            state.renders
        };
        if let Some(registry) = &self.invariants {
            registry.assert_all(&snapshot, &format!("at render {renders}"));
        }
        Ok(())
    }

    fn stop(&mut self) {}
}

/// Run the event loop until nothing is left to do.
///
/// Quiet means no queued input, no undelivered session events, no join in
/// flight, and no media operation in flight. Joins parked by
/// [`SimMediaServer::hold_connects`] and operations parked by
/// [`SimMediaServer::stall_source`] count as quiet. Returns `true` if the App
/// asked to quit.
///
/// # Errors
///
/// Returns an error if the loop has not gone quiet after [`MAX_CYCLES`].
pub async fn run_until_quiet<S: DetailsSource>(
    runtime: &mut Runtime<SimDriver, SimMediaServer, S>,
    server: &SimMediaServer,
) -> Result<bool, SimDriverError> {
    for _ in 0..MAX_CYCLES {
        let quiet = !runtime.driver().has_pending()
            && server.queued_events() == 0
            && (!runtime.has_pending_join() || server.connects_held())
            && runtime.pending_media() <= server.parked_operations();
        if quiet {
            return Ok(false);
        }
        if runtime.process_cycle().await? {
            return Ok(true);
        }
    }
    Err(SimDriverError(format!("event loop still busy after {MAX_CYCLES} cycles")))
}

//! Server lifecycle state machine.

use tokio::sync::watch;

/// Lifecycle phase of the server. Transitions are one-way:
/// `Running → Draining → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Accepting connections and serving requests.
    Running,
    /// No longer accepting; waiting for in-flight work to finish.
    Draining,
    /// Terminal.
    Stopped,
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// All in-flight work finished before the deadline.
    Clean,
    /// The drain deadline elapsed with work still outstanding.
    Forced {
        /// Work units still registered when the deadline hit.
        pending: usize,
    },
}

impl ShutdownOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, ShutdownOutcome::Clean)
    }
}

/// Owner of the lifecycle state, shared by the serve loop, the signal
/// watcher, and any task that wants to stop alongside the server.
///
/// State is carried on a watch channel; the transition methods enforce that
/// it only ever moves forward, regardless of who calls them or how often.
#[derive(Debug, Clone)]
pub struct LifecycleCoordinator {
    state: watch::Sender<ServerState>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ServerState::Running);
        Self { state }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Move from `Running` to `Draining`. Returns whether this call made
    /// the transition; later (or repeated) calls are no-ops.
    pub fn begin_drain(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ServerState::Running {
                *state = ServerState::Draining;
                true
            } else {
                false
            }
        })
    }

    /// Move to the terminal `Stopped` state.
    pub fn mark_stopped(&self) {
        self.state.send_if_modified(|state| {
            if *state != ServerState::Stopped {
                *state = ServerState::Stopped;
                true
            } else {
                false
            }
        });
    }

    /// Resolve once the state has left `Running`.
    pub async fn drain_started(&self) {
        let mut rx = self.subscribe();
        while *rx.borrow_and_update() == ServerState::Running {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

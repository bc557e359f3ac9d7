use serde::Serialize;
use std::fmt;
use tokio::sync::{oneshot, watch};

/// Lifecycle of a managed child; both terminal states are absorbing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "code", rename_all = "snake_case")]
pub enum ProcessState {
    Running,
    /// Exited on its own; `None` when it was ended by a signal we did not send
    Exited(Option<i32>),
    /// Stopped by the supervisor during shutdown
    Killed,
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => write!(f, "running"),
            ProcessState::Exited(Some(code)) => write!(f, "exited with code {code}"),
            ProcessState::Exited(None) => write!(f, "exited"),
            ProcessState::Killed => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(usize);

/// Live record for one spawned child.
///
/// The OS handle itself is owned by the child's watcher task; the entry only
/// holds the switch that asks that task to terminate it.
#[derive(Debug)]
pub struct ManagedProcess {
    pub id: ProcessId,
    pub service_name: String,
    pub command: String,
    pub pid: Option<u32>,
    pub state: ProcessState,
    stop: Option<oneshot::Sender<()>>,
}

impl ManagedProcess {
    pub fn termination_requested(&self) -> bool {
        self.stop.is_none()
    }
}

/// Terminal record kept after a child leaves the active set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub service_name: String,
    pub command: String,
    pub pid: Option<u32>,
    pub state: ProcessState,
}

/// Everything the supervisor tracks for one invocation
#[derive(Debug)]
pub struct SupervisorState {
    active: Vec<ManagedProcess>,
    finished: Vec<ProcessOutcome>,
    shutdown_requested: bool,
    next_id: usize,
    active_count: watch::Sender<usize>,
}

impl SupervisorState {
    pub(crate) fn new(active_count: watch::Sender<usize>) -> Self {
        Self {
            active: Vec::new(),
            finished: Vec::new(),
            shutdown_requested: false,
            next_id: 0,
            active_count,
        }
    }

    pub(crate) fn register(
        &mut self,
        service_name: &str,
        command: &str,
        pid: Option<u32>,
        stop: oneshot::Sender<()>,
    ) -> ProcessId {
        let id = ProcessId(self.next_id);
        self.next_id += 1;
        self.active.push(ManagedProcess {
            id,
            service_name: service_name.to_string(),
            command: command.to_string(),
            pid,
            state: ProcessState::Running,
            stop: Some(stop),
        });
        self.publish();
        id
    }

    /// Move a child to its terminal state and out of the active set.
    /// Returns `None` if it already left.
    pub(crate) fn complete(&mut self, id: ProcessId, state: ProcessState) -> Option<ProcessOutcome> {
        debug_assert!(!state.is_running());
        let position = self.active.iter().position(|p| p.id == id)?;
        let mut process = self.active.remove(position);
        process.state = state;

        let outcome = ProcessOutcome {
            service_name: process.service_name,
            command: process.command,
            pid: process.pid,
            state,
        };
        self.finished.push(outcome.clone());
        self.publish();
        Some(outcome)
    }

    /// Flip the shutdown flag and hand out the stop switches of every running
    /// child. Only the first call gets switches; later calls get `None`.
    pub(crate) fn begin_shutdown(&mut self) -> Option<Vec<(String, oneshot::Sender<()>)>> {
        if self.shutdown_requested {
            return None;
        }
        self.shutdown_requested = true;

        Some(
            self.active
                .iter_mut()
                .filter_map(|p| p.stop.take().map(|stop| (p.service_name.clone(), stop)))
                .collect(),
        )
    }

    pub fn running(&self) -> &[ManagedProcess] {
        &self.active
    }

    pub fn finished(&self) -> &[ProcessOutcome] {
        &self.finished
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Number of children ever registered
    pub fn launched(&self) -> usize {
        self.next_id
    }

    fn publish(&self) {
        self.active_count.send_replace(self.active.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (SupervisorState, watch::Receiver<usize>) {
        let (tx, rx) = watch::channel(0);
        (SupervisorState::new(tx), rx)
    }

    #[test]
    fn test_register_and_complete() {
        let (mut state, count) = state();
        let (stop, _rx) = oneshot::channel();
        let id = state.register("alpha", "start", Some(42), stop);

        assert_eq!(*count.borrow(), 1);
        assert!(state.running()[0].state.is_running());

        let outcome = state.complete(id, ProcessState::Exited(Some(0))).unwrap();
        assert_eq!(outcome.service_name, "alpha");
        assert_eq!(outcome.state, ProcessState::Exited(Some(0)));
        assert!(state.running().is_empty());
        assert_eq!(*count.borrow(), 0);

        // Terminal transitions happen once
        assert!(state.complete(id, ProcessState::Killed).is_none());
        assert_eq!(state.finished().len(), 1);
    }

    #[test]
    fn test_begin_shutdown_only_once() {
        let (mut state, _count) = state();
        let (a, _a) = oneshot::channel();
        let (b, _b) = oneshot::channel();
        state.register("alpha", "start", None, a);
        state.register("beta", "serve", None, b);

        let switches = state.begin_shutdown().unwrap();
        let names: Vec<_> = switches.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert!(state.running().iter().all(ManagedProcess::termination_requested));

        assert!(state.begin_shutdown().is_none());
        assert!(state.shutdown_requested());
    }

    #[test]
    fn test_begin_shutdown_with_nothing_running() {
        let (mut state, _count) = state();
        assert_eq!(state.begin_shutdown().map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProcessState::Exited(Some(3)).to_string(), "exited with code 3");
        assert_eq!(ProcessState::Killed.to_string(), "stopped");
    }
}

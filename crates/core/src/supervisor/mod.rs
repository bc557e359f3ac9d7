//! Process supervision
//!
//! [`Supervisor::launch`] starts one child per [`ResolvedLaunch`], each in its
//! own failure domain. A watcher task per child owns the OS handle, records the
//! exit and removes the child from the active set; two reader tasks per child
//! relay its output to the shared [`Console`]. All bookkeeping lives in one
//! [`SupervisorState`] behind a single lock.
//!
//! Shutdown is triggered through [`Supervisor::run_until_interrupted`] (or
//! [`Supervisor::shutdown`] directly) and waits until every child has stopped.

mod console;
mod state;
mod terminate;

pub use console::{Console, ConsoleEvent, ConsoleSink, StreamKind};
pub use state::{ManagedProcess, ProcessId, ProcessOutcome, ProcessState, SupervisorState};

use crate::command::ServiceCommand;
use crate::config::{RunnerConfig, ShutdownConfig};
use crate::error::{Error, Result};
use crate::types::ResolvedLaunch;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::process::Child;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    /// Time a child gets to honour a termination request
    pub grace: Duration,
    /// Bound on the whole shutdown wait
    pub shutdown_timeout: Option<Duration>,
    /// Bound on waiting for buffered console output in [`Supervisor::finish`]
    pub flush_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self::from(&ShutdownConfig::default())
    }
}

impl From<&ShutdownConfig> for SupervisorOptions {
    fn from(config: &ShutdownConfig) -> Self {
        Self {
            grace: config.grace(),
            shutdown_timeout: config.timeout(),
            flush_timeout: Duration::from_secs(2),
        }
    }
}

/// A launch that never produced a running child
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchFailure {
    pub service_name: String,
    pub command: String,
    pub error: String,
}

/// Why [`Supervisor::run_until_interrupted`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every child exited on its own
    AllExited,
    /// The interrupt fired and shutdown completed (or timed out)
    Interrupted,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub failures: Vec<LaunchFailure>,
    pub outcomes: Vec<ProcessOutcome>,
    /// Services still running when the supervisor gave up waiting
    pub unfinished: Vec<String>,
}

pub struct Supervisor {
    state: Arc<Mutex<SupervisorState>>,
    active: watch::Receiver<usize>,
    console: Console,
    writer: JoinHandle<()>,
    failures: Vec<LaunchFailure>,
    options: SupervisorOptions,
}

impl Supervisor {
    /// Spawn every launch, in order, without waiting on any of them.
    ///
    /// A launch that fails to spawn is recorded as a [`LaunchFailure`] and
    /// reported on the console; the rest of the batch still starts. Must be
    /// called from within a tokio runtime.
    pub fn launch<S: ConsoleSink>(
        launches: Vec<ResolvedLaunch>,
        runner: &RunnerConfig,
        options: SupervisorOptions,
        sink: S,
    ) -> Self {
        let (console, writer) = Console::spawn(sink);
        let (active_count, active) = watch::channel(0);

        let mut supervisor = Self {
            state: Arc::new(Mutex::new(SupervisorState::new(active_count))),
            active,
            console,
            writer,
            failures: Vec::new(),
            options,
        };

        for launch in &launches {
            if let Err(e) = supervisor.spawn_child(launch, runner) {
                warn!(service = %launch.service_name(), "{}", e);
                supervisor.console.send(ConsoleEvent::SpawnFailed {
                    service: launch.service_name().to_string(),
                    command: launch.command.clone(),
                    error: e.to_string(),
                });
                supervisor.failures.push(LaunchFailure {
                    service_name: launch.service_name().to_string(),
                    command: launch.command.clone(),
                    error: e.to_string(),
                });
            }
        }

        supervisor.console.send(ConsoleEvent::Launched {
            running: supervisor.launched(),
            failed: supervisor.failures.len(),
        });

        supervisor
    }

    fn spawn_child(&self, launch: &ResolvedLaunch, runner: &RunnerConfig) -> Result<()> {
        let service = launch.service_name().to_string();
        let command = ServiceCommand::for_launch(launch, runner)?;
        let shell_cmd = command.to_shell_command();

        let mut child = command
            .to_tokio_command()
            .spawn()
            .map_err(|source| Error::SpawnError {
                service: service.clone(),
                command: shell_cmd.clone(),
                source,
            })?;
        let pid = child.id();

        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            drains.push(tokio::spawn(console::drain(
                stdout,
                service.clone(),
                StreamKind::Stdout,
                self.console.clone(),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(tokio::spawn(console::drain(
                stderr,
                service.clone(),
                StreamKind::Stderr,
                self.console.clone(),
            )));
        }

        // Register before the watcher exists so a fast exit always finds its entry
        let (stop_tx, stop_rx) = oneshot::channel();
        let id = self.lock_state().register(&service, &launch.command, pid, stop_tx);

        info!(service = %service, pid = ?pid, "Started: {}", shell_cmd);
        self.console.send(ConsoleEvent::Started {
            service: service.clone(),
            command: launch.command.clone(),
            pid,
        });

        tokio::spawn(watch_child(ChildWatch {
            child,
            id,
            service,
            stop: stop_rx,
            drains,
            state: Arc::clone(&self.state),
            console: self.console.clone(),
            grace: self.options.grace,
        }));

        Ok(())
    }

    /// Stop every running child and wait for all of them.
    ///
    /// Only the first call sends termination requests; every call waits for
    /// the active set to drain, bounded by the configured shutdown timeout.
    pub async fn shutdown(&self) {
        let switches = self.lock_state().begin_shutdown();

        match switches {
            Some(switches) if switches.is_empty() => debug!("Shutdown requested, nothing running"),
            Some(switches) => {
                info!("Stopping {} service(s)", switches.len());
                for (service, stop) in switches {
                    if stop.send(()).is_err() {
                        debug!(service = %service, "Already exited before stop request");
                    }
                }
            }
            None => debug!("Shutdown already in progress"),
        }

        self.wait_idle(self.options.shutdown_timeout).await;
    }

    /// Wait until no child is running. Returns `false` on timeout.
    pub async fn wait_idle(&self, timeout: Option<Duration>) -> bool {
        let mut active = self.active.clone();
        let idle = async move {
            // The sender lives in our own state, so this cannot observe a close
            let _ = active.wait_for(|count| *count == 0).await;
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, idle).await {
                Ok(()) => true,
                Err(_) => {
                    warn!(
                        "Timed out after {:?} with {} service(s) still running",
                        limit,
                        self.active_count()
                    );
                    false
                }
            },
            None => {
                idle.await;
                true
            }
        }
    }

    /// Supervise until every child exits or `interrupt` resolves.
    ///
    /// `interrupt` is called again while shutdown is underway so repeated
    /// interrupts are absorbed instead of reaching the default handler.
    pub async fn run_until_interrupted<F, Fut>(&self, mut interrupt: F) -> StopReason
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.wait_idle(None) => {
                info!("All services exited");
                return StopReason::AllExited;
            }
            _ = interrupt() => info!("Interrupt received, stopping services"),
        }

        let shutdown = self.shutdown();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interrupt() => warn!("Already stopping services, please wait"),
            }
        }

        StopReason::Interrupted
    }

    /// Close the console, let buffered output drain and report the run
    pub async fn finish(self) -> RunSummary {
        let Supervisor {
            state,
            console,
            mut writer,
            failures,
            options,
            ..
        } = self;

        // Readers and watchers hold their own handles; the writer ends with them
        drop(console);
        if tokio::time::timeout(options.flush_timeout, &mut writer)
            .await
            .is_err()
        {
            warn!("Console output still pending after {:?}", options.flush_timeout);
            writer.abort();
        }

        let state = lock(&state);
        RunSummary {
            failures,
            outcomes: state.finished().to_vec(),
            unfinished: state
                .running()
                .iter()
                .map(|p| p.service_name.clone())
                .collect(),
        }
    }

    pub fn failures(&self) -> &[LaunchFailure] {
        &self.failures
    }

    pub fn active_count(&self) -> usize {
        self.lock_state().running().len()
    }

    /// Names of the services currently running, in launch order
    pub fn running(&self) -> Vec<String> {
        self.lock_state()
            .running()
            .iter()
            .map(|p| p.service_name.clone())
            .collect()
    }

    /// Number of children that reached the running state
    pub fn launched(&self) -> usize {
        self.lock_state().launched()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.lock_state().shutdown_requested()
    }

    pub fn outcomes(&self) -> Vec<ProcessOutcome> {
        self.lock_state().finished().to_vec()
    }

    fn lock_state(&self) -> MutexGuard<'_, SupervisorState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<SupervisorState>) -> MutexGuard<'_, SupervisorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ChildWatch {
    child: Child,
    id: ProcessId,
    service: String,
    stop: oneshot::Receiver<()>,
    drains: Vec<JoinHandle<()>>,
    state: Arc<Mutex<SupervisorState>>,
    console: Console,
    grace: Duration,
}

/// Owns one child until it reaches a terminal state
async fn watch_child(watch: ChildWatch) {
    let ChildWatch {
        mut child,
        id,
        service,
        mut stop,
        drains,
        state,
        console,
        grace,
    } = watch;

    let final_state = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => ProcessState::Exited(status.code()),
            Err(e) => {
                warn!(service = %service, "Failed waiting for process: {}", e);
                ProcessState::Exited(None)
            }
        },
        Ok(()) = &mut stop => {
            terminate::terminate(&mut child, &service, grace).await;
            ProcessState::Killed
        }
    };

    if lock(&state).complete(id, final_state).is_some() {
        info!(service = %service, "Process {}", final_state);
    }

    // Print the exit notice after the last line of output
    for drain in drains {
        let _ = drain.await;
    }
    console.send(ConsoleEvent::Exited {
        service,
        state: final_state,
    });
}

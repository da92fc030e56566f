//! The scheduler thread that drives the per-step pipeline.
//!
//! The workspace handle sends commands over a channel; the thread runs one
//! command at a time. Cancellation is cooperative: the stop flag is checked
//! between steps, so an action is never interrupted halfway through.

use crate::core::error::WorkspaceError;
use crate::core::events::UpdaterEvent;
use crate::core::execution::config::ErrorPolicy;
use crate::core::execution::context::UpdateContext;
use crate::core::workspace::shared::WorkspaceShared;
use log::{debug, error, trace, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

/// Whether the update loop is active, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdaterState {
    #[default]
    Idle,
    /// Stepping until stopped
    Running,
    /// Stepping a bounded number of times
    Iterating,
}

/// Receives the final time, or the error that ended an iteration
pub type FinishedCallback = Box<dyn FnOnce(Result<u64, WorkspaceError>) + Send>;

/// Decides from the current time whether another step should run
pub type StepPredicate = Box<dyn FnMut(u64) -> bool + Send>;

enum Command {
    Run,
    Iterate {
        steps: u64,
        on_finished: FinishedCallback,
    },
    IterateWhile {
        predicate: StepPredicate,
        on_finished: FinishedCallback,
    },
    Stop {
        ack: Sender<()>,
    },
    Shutdown,
}

struct Worker {
    commands: Sender<Command>,
    handle: JoinHandle<()>,
}

/// Handle on the scheduler thread, spawned on first use
pub struct Updater {
    shared: Arc<WorkspaceShared>,
    worker: Mutex<Option<Worker>>,
}

impl Updater {
    pub(crate) fn new(shared: Arc<WorkspaceShared>) -> Self {
        Self {
            shared,
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> UpdaterState {
        *self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() != UpdaterState::Idle
    }

    /// True when called from the scheduler thread itself
    pub fn is_scheduler_thread(&self) -> bool {
        self.scheduler_thread_id() == Some(thread::current().id())
    }

    /// Start stepping until stopped. Returns immediately.
    pub fn run(&self) -> Result<(), WorkspaceError> {
        self.launch(UpdaterState::Running, Command::Run)
    }

    /// Step `steps` times on the scheduler thread, then call `on_finished` there
    pub fn iterate_with(
        &self,
        steps: u64,
        on_finished: FinishedCallback,
    ) -> Result<(), WorkspaceError> {
        self.launch(UpdaterState::Iterating, Command::Iterate { steps, on_finished })
    }

    /// Step while `predicate(time)` holds, then call `on_finished` on the scheduler thread
    pub fn iterate_while_with(
        &self,
        predicate: StepPredicate,
        on_finished: FinishedCallback,
    ) -> Result<(), WorkspaceError> {
        self.launch(
            UpdaterState::Iterating,
            Command::IterateWhile {
                predicate,
                on_finished,
            },
        )
    }

    /// Step `steps` times and block until done
    pub fn iterate(&self, steps: u64) -> Result<u64, WorkspaceError> {
        let (tx, rx) = mpsc::channel();
        self.iterate_with(
            steps,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )?;
        Self::wait(rx)
    }

    /// Step while `predicate(time)` holds and block until done
    pub fn iterate_while(&self, predicate: StepPredicate) -> Result<u64, WorkspaceError> {
        let (tx, rx) = mpsc::channel();
        self.iterate_while_with(
            predicate,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )?;
        Self::wait(rx)
    }

    /// Stop the loop and wait until the scheduler has acknowledged.
    ///
    /// Components get `stop()` before the loop is cancelled and
    /// `do_stopped()` once it has ended. The updater reports `Idle` only
    /// after `do_stopped()` has run, so a new run never overlaps the passes
    /// of the previous one. A no-op when idle.
    pub fn stop(&self) -> Result<(), WorkspaceError> {
        if self.is_scheduler_thread() {
            return Err(WorkspaceError::scheduler(
                "stop() called from inside a step; use UpdateContext::request_stop",
            ));
        }
        if !self.is_running() {
            return Ok(());
        }

        let owns_passes = self.shared.claim_stop();
        if owns_passes {
            self.shared.stop_components();
        }

        let (ack, acked) = mpsc::channel();
        self.send(Command::Stop { ack })?;
        acked
            .recv()
            .map_err(|_| WorkspaceError::scheduler("scheduler exited before acknowledging stop"))?;

        if owns_passes {
            complete_stop(&self.shared);
        }
        debug!("Updater stopped at time {}", self.shared.time());
        Ok(())
    }

    /// Claim the updater, start every component and hand the loop to the scheduler
    fn launch(&self, state: UpdaterState, command: Command) -> Result<(), WorkspaceError> {
        {
            let mut current = self.shared.state();
            if *current != UpdaterState::Idle {
                return Err(WorkspaceError::Busy);
            }
            *current = state;
        }
        self.shared.reset_stop_flags();
        self.shared.start_components();
        if let Err(err) = self.send(command) {
            self.shared.set_state(UpdaterState::Idle);
            return Err(err);
        }
        Ok(())
    }

    fn wait(rx: Receiver<Result<u64, WorkspaceError>>) -> Result<u64, WorkspaceError> {
        rx.recv()
            .map_err(|_| WorkspaceError::scheduler("scheduler exited before finishing"))?
    }

    fn send(&self, command: Command) -> Result<(), WorkspaceError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_none() {
            *worker = Some(self.spawn()?);
        }
        match worker.as_ref() {
            Some(worker) => worker
                .commands
                .send(command)
                .map_err(|_| WorkspaceError::scheduler("scheduler thread is gone")),
            None => Err(WorkspaceError::scheduler("scheduler thread is not running")),
        }
    }

    fn spawn(&self) -> Result<Worker, WorkspaceError> {
        let (commands, receiver) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("workspace-updater".to_string())
            .spawn(move || scheduler_loop(shared, receiver))
            .map_err(|err| WorkspaceError::scheduler(err.to_string()))?;
        debug!("Spawned scheduler thread");
        Ok(Worker { commands, handle })
    }

    fn scheduler_thread_id(&self) -> Option<ThreadId> {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|worker| worker.handle.thread().id())
    }
}

impl Drop for Updater {
    /// Cancels a loop in flight with the same component passes as `stop()`,
    /// then shuts the scheduler thread down and joins it.
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };

        let owns_passes = self.state() != UpdaterState::Idle && self.shared.claim_stop();
        if owns_passes {
            self.shared.stop_components();
        }
        let _ = worker.commands.send(Command::Shutdown);
        if worker.handle.thread().id() != thread::current().id() && worker.handle.join().is_err() {
            warn!("Scheduler thread panicked");
        }
        if owns_passes {
            complete_stop(&self.shared);
        }
    }
}

fn scheduler_loop(shared: Arc<WorkspaceShared>, commands: Receiver<Command>) {
    while let Ok(command) = commands.recv() {
        match command {
            Command::Run => run_until_stopped(&shared),
            Command::Iterate { steps, on_finished } => {
                let mut remaining = steps;
                let result = iterate_until(&shared, move |_| {
                    let more = remaining > 0;
                    remaining = remaining.saturating_sub(1);
                    more
                });
                on_finished(result);
            }
            Command::IterateWhile {
                mut predicate,
                on_finished,
            } => {
                let result = iterate_until(&shared, |time| predicate(time));
                on_finished(result);
            }
            Command::Stop { ack } => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
    }
    trace!("Scheduler thread exiting");
}

fn run_until_stopped(shared: &WorkspaceShared) {
    shared.fire_updater(UpdaterEvent::RunStarted);
    while !shared.should_halt() {
        if let Err(err) = execute_step(shared) {
            error!("Run ended by failing step: {}", err);
            break;
        }
    }
    finish(shared);
}

fn iterate_until(
    shared: &WorkspaceShared,
    mut another: impl FnMut(u64) -> bool,
) -> Result<u64, WorkspaceError> {
    shared.fire_updater(UpdaterEvent::RunStarted);
    let mut result = Ok(());
    while !shared.should_halt() && another(shared.time()) {
        result = execute_step(shared);
        if result.is_err() {
            break;
        }
    }
    finish(shared);
    result.map(|()| shared.time())
}

/// Wind the loop down: run the component stop passes unless `stop()` owns them.
///
/// When `stop()` owns them the state is left alone; `stop()` completes the
/// stop after its acknowledgment. The stop flag stays set until the next
/// start, so a late `stop()` sees it claimed and only waits.
fn finish(shared: &WorkspaceShared) {
    if shared.claim_stop() {
        shared.stop_components();
        complete_stop(shared);
    }
}

/// `do_stopped()` on every component, then report the updater idle
fn complete_stop(shared: &WorkspaceShared) {
    shared.notify_stopped();
    shared.set_state(UpdaterState::Idle);
    shared.fire_updater(UpdaterEvent::RunStopped {
        time: shared.time(),
    });
}

/// Run every action once in pipeline order, then advance time
pub(crate) fn execute_step(shared: &WorkspaceShared) -> Result<(), WorkspaceError> {
    let delay = shared.config.update_delay;
    if !delay.is_zero() {
        thread::sleep(delay);
    }

    // Snapshot so actions may edit the pipeline for the next step
    let actions = shared.actions().actions().to_vec();
    let ctx = UpdateContext::new(shared);
    for action in &actions {
        trace!("Step {}: {}", shared.time(), action.name());
        if let Err(err) = action.invoke(&ctx) {
            match shared.config.error_policy {
                ErrorPolicy::LogAndContinue => {
                    warn!("Update action '{}' failed: {}", action.name(), err);
                    shared.fire_updater(UpdaterEvent::ActionFailed {
                        action: action.name().to_string(),
                        message: err.to_string(),
                    });
                }
                ErrorPolicy::Abort => return Err(err.in_action(action.name())),
            }
        }
    }

    let time = shared.advance_time();
    shared.fire_updater(UpdaterEvent::StepCompleted { time });
    Ok(())
}

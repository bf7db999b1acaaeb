//! Mission worker thread.
//!
//! Hosts a [`TaskOrchestrator`] on a thread named `mission`. Commands arrive
//! over a crossbeam channel; progress flows back as [`MissionUpdate`] values.
//! Only one mission runs at a time: a command submitted while another is in
//! flight is rejected with [`FetchError::Busy`] before it reaches the worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};

use crate::command::TaskPlan;
use crate::error::{FetchError, Result};
use crate::mission::{AbortHandle, AgentState, MissionReport, Progress, TaskOrchestrator};

/// Progress reported by the worker
#[derive(Clone, Debug)]
pub enum MissionUpdate {
    /// Command parsed, mission started
    Accepted(TaskPlan),
    /// Command refused; the worker stays idle
    Rejected { command: String, error: String },
    StateChanged { from: AgentState, to: AgentState },
    /// Answer to a status request
    Status(String),
    Finished(MissionReport),
}

enum Request {
    Command(String),
    Status,
    Shutdown,
}

/// Handle to the mission worker.
pub struct MissionRunner {
    requests: Sender<Request>,
    updates: Receiver<MissionUpdate>,
    abort: AbortHandle,
    /// Set from submission until the mission's final report
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MissionRunner {
    /// Start the worker. `tick_interval` is slept between active ticks.
    pub fn spawn(orchestrator: TaskOrchestrator, tick_interval: Duration) -> Result<Self> {
        let (request_tx, request_rx) = unbounded();
        let (update_tx, update_rx) = unbounded();
        let abort = orchestrator.abort_handle();
        let busy = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            orchestrator,
            requests: request_rx,
            updates: update_tx,
            busy: Arc::clone(&busy),
            tick_interval,
            stopping: false,
        };
        let handle = thread::Builder::new()
            .name("mission".into())
            .spawn(move || worker.run())?;

        Ok(Self {
            requests: request_tx,
            updates: update_rx,
            abort,
            busy,
            handle: Some(handle),
        })
    }

    /// Queue a command. Fails with `Busy` while a mission is running.
    pub fn submit(&self, raw: &str) -> Result<()> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FetchError::Busy);
        }
        if self.requests.send(Request::Command(raw.to_string())).is_err() {
            self.busy.store(false, Ordering::SeqCst);
            return Err(FetchError::Internal("mission worker has stopped".to_string()));
        }
        Ok(())
    }

    /// Ask for a [`MissionUpdate::Status`] line
    pub fn request_status(&self) {
        let _ = self.requests.send(Request::Status);
    }

    /// Stop the running mission at its next tick
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// True from submission until the mission's report is sent
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> &Receiver<MissionUpdate> {
        &self.updates
    }

    /// Abort any mission, stop the worker and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.is_busy() {
                self.abort.abort();
            }
            let _ = self.requests.send(Request::Shutdown);
            if handle.join().is_err() {
                tracing::error!("Mission thread panicked");
            }
        }
    }
}

impl Drop for MissionRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    orchestrator: TaskOrchestrator,
    requests: Receiver<Request>,
    updates: Sender<MissionUpdate>,
    busy: Arc<AtomicBool>,
    tick_interval: Duration,
    stopping: bool,
}

impl Worker {
    fn run(mut self) {
        tracing::debug!("Mission thread started");
        loop {
            if self.orchestrator.state().is_active() {
                self.drain_requests();
                self.tick();
            } else if self.stopping {
                break;
            } else {
                match self.requests.recv() {
                    Ok(Request::Command(raw)) => self.start(&raw),
                    Ok(Request::Status) => self.emit(MissionUpdate::Status(
                        self.orchestrator.status_line(),
                    )),
                    Ok(Request::Shutdown) | Err(_) => break,
                }
            }
        }
        tracing::debug!("Mission thread exiting");
    }

    fn start(&mut self, raw: &str) {
        match self.orchestrator.begin(raw) {
            Ok(plan) => {
                self.emit(MissionUpdate::Accepted(plan));
                self.emit(MissionUpdate::StateChanged {
                    from: AgentState::Idle,
                    to: self.orchestrator.state(),
                });
            }
            Err(e) => {
                tracing::warn!("Command rejected: {}", e);
                self.busy.store(false, Ordering::SeqCst);
                self.emit(MissionUpdate::Rejected {
                    command: raw.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    fn tick(&mut self) {
        let before = self.orchestrator.state();
        match self.orchestrator.step() {
            Progress::Running(after) => {
                if after != before {
                    self.emit(MissionUpdate::StateChanged {
                        from: before,
                        to: after,
                    });
                }
                if !self.tick_interval.is_zero() {
                    self.pause();
                }
            }
            Progress::Finished(report) => {
                self.emit(MissionUpdate::StateChanged {
                    from: before,
                    to: AgentState::Idle,
                });
                self.busy.store(false, Ordering::SeqCst);
                self.emit(MissionUpdate::Finished(report));
            }
            Progress::Idle => {
                self.busy.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Sleep between ticks, waking early for requests
    fn pause(&mut self) {
        match self.requests.recv_timeout(self.tick_interval) {
            Ok(request) => self.handle_active(request),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => self.begin_stop(),
        }
    }

    fn drain_requests(&mut self) {
        loop {
            match self.requests.try_recv() {
                Ok(request) => self.handle_active(request),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.begin_stop();
                    break;
                }
            }
        }
    }

    fn handle_active(&mut self, request: Request) {
        match request {
            Request::Command(raw) => self.emit(MissionUpdate::Rejected {
                command: raw,
                error: FetchError::Busy.to_string(),
            }),
            Request::Status => self.emit(MissionUpdate::Status(self.orchestrator.status_line())),
            Request::Shutdown => self.begin_stop(),
        }
    }

    fn begin_stop(&mut self) {
        if !self.stopping {
            self.stopping = true;
            self.orchestrator.abort_handle().abort();
        }
    }

    fn emit(&self, update: MissionUpdate) {
        // The receiving side may already be gone during shutdown
        let _ = self.updates.send(update);
    }
}

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use watchrun::engine::{
    rebuild_queue, Enqueue, RebuildSender, RebuildSignal, Supervisor, SupervisorState,
    REBUILD_QUEUE_CAPACITY,
};
use watchrun::errors::Result;
use watchrun::signal::{shutdown_channel, ShutdownTrigger};
use watchrun::types::CommandSpec;

use crate::fake_executor::{FakeController, FakeExecutor};
use crate::with_timeout;

/// Builder for a supervisor running on a [`FakeExecutor`].
pub struct HarnessBuilder {
    build_cmd: CommandSpec,
    run_cmd: CommandSpec,
    capacity: usize,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            build_cmd: CommandSpec::new("go", ["build"]),
            run_cmd: CommandSpec::new("./app", Vec::<String>::new()),
            capacity: REBUILD_QUEUE_CAPACITY,
        }
    }

    pub fn build_cmd(mut self, cmd: &str) -> Self {
        self.build_cmd = cmd.parse().expect("valid build command");
        self
    }

    pub fn run_cmd(mut self, cmd: &str) -> Self {
        self.run_cmd = cmd.parse().expect("valid run command");
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Spawn the supervisor loop on the current Tokio runtime. Nothing
    /// happens until a rebuild signal is offered.
    pub fn spawn(self) -> Harness {
        let (executor, ctl) = FakeExecutor::new();
        let (rebuilds, rebuild_rx) = rebuild_queue(self.capacity);
        let (trigger, shutdown) = shutdown_channel();

        let supervisor = Supervisor::new(
            executor,
            self.build_cmd,
            self.run_cmd,
            rebuild_rx,
            shutdown,
        );
        let states = supervisor.subscribe_state();
        let task = tokio::spawn(supervisor.run());

        Harness {
            rebuilds,
            trigger,
            states,
            ctl,
            task,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running supervisor plus the handles to drive and observe it.
pub struct Harness {
    pub rebuilds: RebuildSender,
    pub trigger: ShutdownTrigger,
    pub states: watch::Receiver<SupervisorState>,
    pub ctl: FakeController,
    task: JoinHandle<Result<()>>,
}

impl Harness {
    /// Offer a file-change rebuild signal.
    pub fn change(&self) -> Enqueue {
        self.rebuilds.offer(RebuildSignal::file_change())
    }

    /// Offer the startup rebuild signal.
    pub fn start(&self) -> Enqueue {
        self.rebuilds.offer(RebuildSignal::startup())
    }

    pub fn shutdown(&mut self) -> bool {
        self.trigger.fire()
    }

    pub fn state(&self) -> SupervisorState {
        *self.states.borrow()
    }

    pub async fn wait_for_state(&mut self, state: SupervisorState) {
        with_timeout(self.states.wait_for(|s| *s == state))
            .await
            .expect("supervisor dropped its state channel");
    }

    /// Poll `cond` until it holds (5s timeout).
    pub async fn eventually<F>(&self, mut cond: F)
    where
        F: FnMut(&FakeController) -> bool,
    {
        with_timeout(async {
            while !cond(&self.ctl) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the supervisor loop to return.
    pub async fn join(self) -> Result<()> {
        with_timeout(self.task).await.expect("supervisor task panicked")
    }
}

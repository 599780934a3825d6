use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use watchrun::engine::ExitOutcome;
use watchrun::errors::{Result, WatchrunError};
use watchrun::exec::{ExecutorBackend, HandleFuture, ProcessHandle};
use watchrun::types::{CommandSpec, ProcessRole};

/// Something the fake executor observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Spawned {
        role: ProcessRole,
        id: u32,
        program: String,
    },
    Killed {
        id: u32,
    },
    Reaped {
        id: u32,
        outcome: ExitOutcome,
    },
}

#[derive(Default)]
struct Inner {
    next_id: u32,
    calls: Vec<Call>,
    build_outcomes: VecDeque<ExitOutcome>,
    hold_builds: bool,
    held_builds: VecDeque<u32>,
    unspawnable: HashSet<String>,
    fail_kills: bool,
    ignore_kills: bool,
    exits: HashMap<u32, watch::Sender<Option<ExitOutcome>>>,
    live: HashMap<ProcessRole, usize>,
    peak: HashMap<ProcessRole, usize>,
}

/// Test-side handle to script and inspect a [`FakeExecutor`].
///
/// - Builds exit immediately with the next scripted outcome (default
///   success), unless builds are held; held builds exit on
///   [`FakeController::release_build`].
/// - Applications run until killed or until [`FakeController::exit_process`].
#[derive(Clone, Default)]
pub struct FakeController {
    inner: Arc<Mutex<Inner>>,
}

impl FakeController {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Queue the outcome of the next non-held build.
    pub fn push_build_outcome(&self, outcome: ExitOutcome) {
        self.lock().build_outcomes.push_back(outcome);
    }

    /// Keep future builds running until released.
    pub fn hold_builds(&self, hold: bool) {
        self.lock().hold_builds = hold;
    }

    /// Let the oldest held build exit. Returns `false` if none is held.
    pub fn release_build(&self, outcome: ExitOutcome) -> bool {
        let mut inner = self.lock();
        let Some(id) = inner.held_builds.pop_front() else {
            return false;
        };
        if let Some(tx) = inner.exits.get(&id) {
            tx.send_replace(Some(outcome));
        }
        true
    }

    /// Make a process exit on its own.
    pub fn exit_process(&self, id: u32, outcome: ExitOutcome) {
        if let Some(tx) = self.lock().exits.get(&id) {
            tx.send_if_modified(|current| {
                if current.is_none() {
                    *current = Some(outcome);
                    true
                } else {
                    false
                }
            });
        }
    }

    /// Spawning `program` fails as if the executable did not exist.
    pub fn mark_unspawnable(&self, program: &str) {
        self.lock().unspawnable.insert(program.to_string());
    }

    /// Every kill request fails.
    pub fn fail_kills(&self, fail: bool) {
        self.lock().fail_kills = fail;
    }

    /// Kills are recorded and succeed, but the process keeps running until
    /// [`FakeController::exit_process`], like a child slow to die.
    pub fn ignore_kills(&self, ignore: bool) {
        self.lock().ignore_kills = ignore;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Ids of processes spawned in `role`, in spawn order.
    pub fn spawned(&self, role: ProcessRole) -> Vec<u32> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Spawned { role: r, id, .. } if *r == role => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn killed(&self) -> Vec<u32> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Killed { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn reaped(&self) -> Vec<u32> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Reaped { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Spawned and not yet reaped.
    pub fn live(&self, role: ProcessRole) -> usize {
        self.lock().live.get(&role).copied().unwrap_or(0)
    }

    /// Highest number of simultaneously live processes seen in `role`.
    pub fn peak_live(&self, role: ProcessRole) -> usize {
        self.lock().peak.get(&role).copied().unwrap_or(0)
    }

    fn retire(&self, id: u32, role: ProcessRole, outcome: ExitOutcome) {
        let mut inner = self.lock();
        if let Some(n) = inner.live.get_mut(&role) {
            *n = n.saturating_sub(1);
        }
        inner.calls.push(Call::Reaped { id, outcome });
    }
}

/// Executor backend that never touches the OS.
pub struct FakeExecutor {
    ctl: FakeController,
}

impl FakeExecutor {
    pub fn new() -> (Self, FakeController) {
        let ctl = FakeController::default();
        (Self { ctl: ctl.clone() }, ctl)
    }
}

impl ExecutorBackend for FakeExecutor {
    type Handle = FakeHandle;

    fn spawn(&mut self, spec: &CommandSpec, role: ProcessRole) -> Result<FakeHandle> {
        let mut inner = self.ctl.lock();

        if inner.unspawnable.contains(spec.program()) {
            return Err(WatchrunError::Spawn {
                command: spec.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            });
        }

        inner.next_id += 1;
        let id = inner.next_id;

        let (tx, rx) = watch::channel(None);
        if role == ProcessRole::Build {
            if inner.hold_builds {
                inner.held_builds.push_back(id);
            } else {
                let outcome = inner.build_outcomes.pop_front().unwrap_or(ExitOutcome::Success);
                tx.send_replace(Some(outcome));
            }
        }
        inner.exits.insert(id, tx);

        let live = {
            let n = inner.live.entry(role).or_insert(0);
            *n += 1;
            *n
        };
        let peak = inner.peak.entry(role).or_insert(0);
        *peak = (*peak).max(live);

        inner.calls.push(Call::Spawned {
            role,
            id,
            program: spec.program().to_string(),
        });

        Ok(FakeHandle {
            id,
            role,
            spec: spec.clone(),
            exit_rx: rx,
            ctl: self.ctl.clone(),
            reaped: false,
        })
    }
}

/// Process handle produced by [`FakeExecutor`].
pub struct FakeHandle {
    id: u32,
    role: ProcessRole,
    spec: CommandSpec,
    exit_rx: watch::Receiver<Option<ExitOutcome>>,
    ctl: FakeController,
    reaped: bool,
}

impl ProcessHandle for FakeHandle {
    fn id(&self) -> Option<u32> {
        (!self.reaped).then_some(self.id)
    }

    fn command(&self) -> &CommandSpec {
        &self.spec
    }

    fn kill(&mut self) -> HandleFuture<'_, ()> {
        Box::pin(async move {
            let fail = self.ctl.lock().fail_kills;
            if fail {
                return Err(WatchrunError::Kill {
                    command: self.spec.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "operation not permitted"),
                });
            }

            let ignore = {
                let mut inner = self.ctl.lock();
                inner.calls.push(Call::Killed { id: self.id });
                inner.ignore_kills
            };
            if !ignore {
                self.ctl.exit_process(self.id, ExitOutcome::Failed(-1));
            }
            Ok(())
        })
    }

    fn wait(&mut self) -> HandleFuture<'_, ExitOutcome> {
        Box::pin(async move {
            let outcome = {
                let current = self
                    .exit_rx
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| WatchrunError::Wait {
                        command: self.spec.to_string(),
                        source: io::Error::other("fake process vanished"),
                    })?;
                (*current).unwrap_or(ExitOutcome::Failed(-1))
            };

            if !self.reaped {
                self.reaped = true;
                self.ctl.retire(self.id, self.role, outcome);
            }
            Ok(outcome)
        })
    }
}

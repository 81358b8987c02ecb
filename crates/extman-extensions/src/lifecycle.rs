//! Process-scoped registry of running extension runtimes
//!
//! `main` owns one [`ClientLifecycle`] and keeps a [`LifecycleGuard`] alive
//! for the whole run; dropping the guard tears every registered runtime
//! down, including on early returns and unwinding.

use extman_core::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A live extension the host must clean up before exiting
pub trait ExtensionRuntime: Send {
    /// Extension name, for logging
    fn name(&self) -> &str;

    /// Stop the runtime and release its resources
    fn shutdown(&mut self) -> Result<()>;

    /// Block until the runtime exits on its own, returning its exit code
    fn wait(&mut self) -> Result<Option<i32>>;
}

/// Extension running as a child process
pub struct ProcessRuntime {
    name: String,
    child: Child,
}

impl ProcessRuntime {
    /// Launch `binary` with `args`, inheriting stdio
    pub fn spawn(name: impl Into<String>, binary: &Path, args: &[String]) -> Result<Self> {
        let name = name.into();
        let child = Command::new(binary).args(args).spawn()?;
        debug!("Spawned {} as pid {}", name, child.id());
        Ok(Self { name, child })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl ExtensionRuntime for ProcessRuntime {
    fn name(&self) -> &str {
        &self.name
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            debug!("Killing {} (pid {})", self.name, self.child.id());
            self.child.kill()?;
        }
        self.child.wait()?;
        Ok(())
    }

    fn wait(&mut self) -> Result<Option<i32>> {
        Ok(self.child.wait()?.code())
    }
}

/// Handle to a registered runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(usize);

/// Registry of active runtimes, torn down once at exit
#[derive(Default)]
pub struct ClientLifecycle {
    runtimes: Mutex<Vec<Option<Box<dyn ExtensionRuntime>>>>,
    torn_down: AtomicBool,
}

impl ClientLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `runtime` until teardown
    ///
    /// A runtime registered after teardown is shut down immediately and its
    /// id never resolves.
    pub fn register(&self, mut runtime: Box<dyn ExtensionRuntime>) -> RuntimeId {
        let mut runtimes = self.lock();
        if !self.torn_down.load(Ordering::SeqCst) {
            debug!("Registering runtime {}", runtime.name());
            runtimes.push(Some(runtime));
            return RuntimeId(runtimes.len() - 1);
        }

        runtimes.push(None);
        let id = RuntimeId(runtimes.len() - 1);
        drop(runtimes);

        warn!("Lifecycle already torn down, stopping {}", runtime.name());
        if let Err(e) = runtime.shutdown() {
            warn!("Failed to shut down {}: {}", runtime.name(), e);
        }
        id
    }

    /// Run `f` against a registered runtime
    ///
    /// The registry stays locked for the duration of `f`.
    pub fn with_runtime<T>(
        &self,
        id: RuntimeId,
        f: impl FnOnce(&mut dyn ExtensionRuntime) -> Result<T>,
    ) -> Result<T> {
        let mut runtimes = self.lock();
        match runtimes.get_mut(id.0).and_then(Option::as_mut) {
            Some(runtime) => f(runtime.as_mut()),
            None => Err(Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                "runtime already torn down",
            ))),
        }
    }

    /// Number of runtimes awaiting teardown
    pub fn len(&self) -> usize {
        self.lock().iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shut down every registered runtime
    ///
    /// Only the first call does any work. Individual failures are logged
    /// and do not stop the remaining runtimes from being shut down.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let runtimes: Vec<_> = self.lock().drain(..).flatten().collect();
        if runtimes.is_empty() {
            return;
        }

        info!("Shutting down {} extension runtime(s)", runtimes.len());
        for mut runtime in runtimes {
            match runtime.shutdown() {
                Ok(()) => debug!("Shut down {}", runtime.name()),
                Err(e) => warn!("Failed to shut down {}: {}", runtime.name(), e),
            }
        }
    }

    /// Guard tearing this lifecycle down when dropped
    pub fn guard(&self) -> LifecycleGuard<'_> {
        LifecycleGuard { lifecycle: self }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<Box<dyn ExtensionRuntime>>>> {
        // A panic while holding the lock leaves the list intact
        self.runtimes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Runs [`ClientLifecycle::teardown`] on drop
pub struct LifecycleGuard<'a> {
    lifecycle: &'a ClientLifecycle,
}

impl Drop for LifecycleGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}

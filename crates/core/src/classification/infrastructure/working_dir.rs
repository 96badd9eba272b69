use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// The process working directory is global state shared by every thread;
// all scoped changes must hold this lock so they cannot interleave.
static CWD_LOCK: Mutex<()> = Mutex::new(());

// Tests that capture or compare the working directory serialize on this
// separate mutex so another test's in-flight guard cannot skew their
// pre/post snapshots. Never taken while holding a guard.
#[cfg(test)]
pub(crate) static CWD_TEST_MUTEX: Mutex<()> = Mutex::new(());

/// Scoped change of the process working directory.
///
/// Saves the current directory, changes into `dir`, and restores the
/// saved directory when dropped, on every exit path including unwinding.
/// The guard holds a process-global lock for its whole lifetime, which
/// serializes concurrent change-and-work critical sections.
pub struct WorkingDirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub fn change_to(dir: &Path) -> io::Result<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let original = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(Self {
            original,
            _lock: lock,
        })
    }

    /// The directory that will be restored on drop.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            log::error!(
                "failed to restore working directory to {}: {e}",
                self.original.display()
            );
        }
    }
}

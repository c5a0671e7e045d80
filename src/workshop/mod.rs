pub mod csa;

pub use csa::CsaWorkshop;

use crate::error::Result;

/// Handle to a running engine worker. Held by the individual from `start`
/// until `stop`; releasing it kills the process.
pub trait WorkerHandle: Send {
    /// Kill the worker and block until it has exited.
    fn shutdown(&mut self) -> std::io::Result<()>;
}

impl WorkerHandle for std::process::Child {
    fn shutdown(&mut self) -> std::io::Result<()> {
        self.kill()?;
        self.wait()?;
        Ok(())
    }
}

/// Build and spawn surface for individuals. The production implementation
/// checks out and compiles the engine; tests substitute an in-memory fake.
pub trait Workshop: Send + Sync {
    /// Materialize a working area for `id`: source checkout, parameter
    /// overrides, build, shared assets, runtime configuration.
    fn setup(&self, id: &str, values: &[i32]) -> Result<()>;

    /// Launch the built worker for `id`.
    fn spawn(&self, id: &str) -> Result<Box<dyn WorkerHandle>>;

    /// Remove the working area for `id`. Best-effort.
    fn clean(&self, id: &str);
}

#[cfg(test)]
pub mod testing {
    use super::{WorkerHandle, Workshop};
    use crate::error::{Result, TunerError};
    use std::sync::Mutex;

    pub struct FakeHandle;

    impl WorkerHandle for FakeHandle {
        fn shutdown(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// In-memory workshop that records lifecycle calls and can be told to
    /// fail setup for chosen ids.
    #[derive(Default)]
    pub struct FakeWorkshop {
        pub fail_setup_ids: Mutex<Vec<String>>,
        set_up: Mutex<Vec<String>>,
        spawned: Mutex<Vec<String>>,
        cleaned: Mutex<Vec<String>>,
    }

    impl FakeWorkshop {
        pub fn set_up(&self) -> Vec<String> {
            self.set_up.lock().unwrap().clone()
        }

        pub fn spawned(&self) -> Vec<String> {
            self.spawned.lock().unwrap().clone()
        }

        pub fn cleaned(&self) -> Vec<String> {
            self.cleaned.lock().unwrap().clone()
        }
    }

    impl Workshop for FakeWorkshop {
        fn setup(&self, id: &str, _values: &[i32]) -> Result<()> {
            if self.fail_setup_ids.lock().unwrap().iter().any(|f| f == id) {
                return Err(TunerError::Setup {
                    id: id.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
            self.set_up.lock().unwrap().push(id.to_string());
            Ok(())
        }

        fn spawn(&self, id: &str) -> Result<Box<dyn WorkerHandle>> {
            self.spawned.lock().unwrap().push(id.to_string());
            Ok(Box::new(FakeHandle))
        }

        fn clean(&self, id: &str) {
            self.cleaned.lock().unwrap().push(id.to_string());
        }
    }
}

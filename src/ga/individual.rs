use super::identity;
use crate::config::Param;
use crate::error::{Result, TunerError};
use crate::workshop::{WorkerHandle, Workshop};
use std::sync::Arc;

/// One candidate parameter vector together with its worker process and the
/// score it has accumulated. Individuals are never reused: each lives for
/// exactly one generation and is stopped and cleaned on the way out.
pub struct Individual {
    id: String,
    values: Vec<i32>,
    score: f64,
    process: Option<Box<dyn WorkerHandle>>,
    workshop: Arc<dyn Workshop>,
}

impl Individual {
    /// Create an individual whose id is derived from its gene vector.
    /// Every gene must lie within its parameter's bounds.
    pub fn new(workshop: Arc<dyn Workshop>, params: &[Param], values: Vec<i32>) -> Self {
        debug_assert!(
            params
                .iter()
                .zip(&values)
                .all(|(p, &v)| v >= p.minimum_value && v <= p.maximum_value),
            "gene vector out of bounds"
        );
        let id = identity::derive_id(params, &values);
        Self::with_id(workshop, values, id)
    }

    /// Create an individual with an explicit id, bypassing derivation.
    /// Used for the distinguished first-elite seed.
    pub fn with_id(workshop: Arc<dyn Workshop>, values: Vec<i32>, id: String) -> Self {
        Self {
            id,
            values,
            score: 0.0,
            process: None,
            workshop,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Materialize the working area: checkout, parameter overrides, build,
    /// shared assets, runtime configuration. Leaves no process running on
    /// failure.
    pub fn setup(&self) -> Result<()> {
        self.workshop.setup(&self.id, &self.values)
    }

    /// Spawn the long-running worker. Fails if already started.
    pub fn start(&mut self) -> Result<()> {
        if self.process.is_some() {
            return Err(TunerError::Start {
                id: self.id.clone(),
                reason: "already started".to_string(),
            });
        }
        self.process = Some(self.workshop.spawn(&self.id)?);
        Ok(())
    }

    /// Terminate the worker and wait for it to exit. Teardown is
    /// best-effort: failures are logged, never raised.
    pub fn stop(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.shutdown() {
                log::warn!("failed to stop {}: {}", self.id, e);
            }
        }
    }

    /// Remove the working area. Safe even when setup never completed.
    pub fn clean(&mut self) {
        self.workshop.clean(&self.id);
    }

    /// The only teardown path the engine uses between generations.
    pub fn stop_with_clean(&mut self) {
        self.stop();
        self.clean();
    }
}

impl std::fmt::Debug for Individual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Individual")
            .field("id", &self.id)
            .field("values", &self.values)
            .field("score", &self.score)
            .field("running", &self.process.is_some())
            .finish()
    }
}

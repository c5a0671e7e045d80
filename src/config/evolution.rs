use crate::error::TunerError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// One tunable engine parameter: a stable name plus the closed value range
/// the search is allowed to explore. `first_elite_value` seeds the initial
/// elite individual with the hand-tuned baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub first_elite_value: i32,
    pub minimum_value: i32,
    pub maximum_value: i32,
}

impl Param {
    pub fn new(name: &str, first_elite_value: i32, minimum_value: i32, maximum_value: i32) -> Self {
        Self {
            name: name.to_string(),
            first_elite_value,
            minimum_value,
            maximum_value,
        }
    }

    /// Number of distinct values this parameter can take.
    pub fn span(&self) -> u64 {
        (self.maximum_value as i64 - self.minimum_value as i64 + 1) as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub params: Vec<Param>,
    pub population_size: usize,
    pub elite_count: usize,
    pub random_inject_count: usize,
    /// Mutation probability is 1/N; a child is mutated when a uniform draw
    /// over [0, N) lands on 0.
    pub mutation_denominator: u32,
    /// A reported rating is ignored until the player has this many games.
    pub min_games: u32,
    pub generation_interval_secs: u64,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            params: default_search_params(),
            population_size: 32,
            elite_count: 1,
            random_inject_count: 1,
            mutation_denominator: 10,
            min_games: 100,
            generation_interval_secs: 4 * 60 * 60,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn generation_interval(&self) -> Duration {
        Duration::from_secs(self.generation_interval_secs)
    }

    pub fn validate(&self) -> Result<(), TunerError> {
        if self.population_size == 0 {
            return Err(TunerError::Configuration(
                "population_size must not be zero".to_string(),
            ));
        }
        if self.population_size % 2 != 0 {
            return Err(TunerError::Configuration(
                "population_size must be an even number".to_string(),
            ));
        }
        if self.elite_count == 0 {
            return Err(TunerError::Configuration(
                "elite_count must be at least 1".to_string(),
            ));
        }
        if self.elite_count + self.random_inject_count >= self.population_size {
            return Err(TunerError::Configuration(
                "elite_count + random_inject_count must leave room for offspring".to_string(),
            ));
        }
        if self.mutation_denominator == 0 {
            return Err(TunerError::Configuration(
                "mutation_denominator must not be zero".to_string(),
            ));
        }
        if self.params.is_empty() {
            return Err(TunerError::Configuration(
                "at least one parameter is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for param in &self.params {
            if param.minimum_value > param.maximum_value {
                return Err(TunerError::Configuration(format!(
                    "{}: minimum_value exceeds maximum_value",
                    param.name
                )));
            }
            if param.first_elite_value < param.minimum_value
                || param.first_elite_value > param.maximum_value
            {
                return Err(TunerError::Configuration(format!(
                    "{}: first_elite_value is out of bounds",
                    param.name
                )));
            }
            if !names.insert(param.name.as_str()) {
                return Err(TunerError::Configuration(format!(
                    "duplicate parameter name {}",
                    param.name
                )));
            }
        }

        // Identity derivation requires every individual to have a distinct
        // gene vector, so the search space must at least fit the population.
        let mut space: u64 = 1;
        for param in &self.params {
            space = space.saturating_mul(param.span());
        }
        if space < self.population_size as u64 {
            return Err(TunerError::Configuration(
                "parameter ranges are too narrow for the population size".to_string(),
            ));
        }

        Ok(())
    }
}

/// The search parameters of the tuned engine, with their hand-tuned
/// baseline values and search bounds.
pub fn default_search_params() -> Vec<Param> {
    vec![
        Param::new("EXT_DEPTH_CHECK", 3, 0, 8),
        Param::new("EXT_DEPTH_ONE_REPLY", 2, 0, 8),
        Param::new("EXT_DEPTH_RECAP", 1, 0, 8),
        Param::new("NULL_DEPTH_RATE", 11, 4, 16),
        Param::new("NULL_DEPTH_REDUCE", 12, 0, 20),
        Param::new("NULL_DEPTH_VRATE", 150, 10, 800),
        Param::new("REDUCTION_RATE1", 10, 5, 30),
        Param::new("REDUCTION_RATE2", 10, 5, 30),
        Param::new("RAZOR_MARGIN1", 300, 10, 800),
        Param::new("RAZOR_MARGIN2", 400, 10, 800),
        Param::new("RAZOR_MARGIN3", 400, 10, 800),
        Param::new("RAZOR_MARGIN4", 450, 10, 800),
        Param::new("FUT_PRUN_MAX_DEPTH", 28, 4, 64),
        Param::new("FUT_PRUN_MARGIN_RATE", 75, 10, 200),
        Param::new("FUT_PRUN_MARGIN", 500, 50, 800),
        Param::new("PROBCUT_MARGIN", 200, 50, 500),
        Param::new("PROBCUT_REDUCTION", 4, 1, 10),
        Param::new("ASP_MIN_DEPTH", 6, 2, 10),
        Param::new("ASP_1ST_DELTA", 128, 32, 256),
        Param::new("ASP_DELTA_RATE", 50, 25, 200),
        Param::new("SINGULAR_DEPTH", 8, 4, 12),
        Param::new("SINGULAR_MARGIN", 3, 1, 32),
    ]
}

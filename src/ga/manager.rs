use super::{identity, lifecycle, operators, Individual};
use crate::config::EvolutionConfig;
use crate::error::Result;
use crate::rating::{RateTable, RatingSource};
use crate::workshop::Workshop;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;

/// Fixed label for the seeded baseline individual; every other id is
/// derived from the gene vector.
pub const FIRST_ELITE_ID: &str = "first-elite";

/// Crossover redraws allowed per slot before falling back to a random
/// vector. Duplicate offspring are rejected by id, and a nearly converged
/// population can exhaust its distinct crossover outcomes.
const MAX_CROSSOVER_ATTEMPTS: u32 = 50;

/// Runs the generational loop: bring a population up, let it accumulate
/// ratings, rank it, breed the next generation and swap.
pub struct GaManager {
    config: EvolutionConfig,
    workshop: Arc<dyn Workshop>,
    rating: Box<dyn RatingSource>,
    individuals: Vec<Individual>,
    rng: StdRng,
    destroyed: bool,
}

impl GaManager {
    /// Fails fast on an invalid configuration, before any process exists.
    pub fn new(
        config: EvolutionConfig,
        workshop: Arc<dyn Workshop>,
        rating: Box<dyn RatingSource>,
    ) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            workshop,
            rating,
            individuals: Vec::new(),
            rng,
            destroyed: false,
        })
    }

    /// Build and bring up the initial population: the seeded first elite
    /// plus uniformly random individuals. Returns the first bring-up error,
    /// but leaves every successfully started individual running.
    pub fn start(&mut self) -> Result<()> {
        self.rating.setup()?;

        let mut individuals = Vec::with_capacity(self.config.population_size);
        let mut seen = HashSet::new();

        let elite_values = operators::first_elite_values(&self.config.params);
        seen.insert(identity::derive_id(&self.config.params, &elite_values));
        individuals.push(Individual::with_id(
            self.workshop.clone(),
            elite_values,
            FIRST_ELITE_ID.to_string(),
        ));

        while individuals.len() < self.config.population_size {
            let values = operators::random_values(&self.config.params, &mut self.rng);
            let id = identity::derive_id(&self.config.params, &values);
            if !seen.insert(id.clone()) {
                continue;
            }
            individuals.push(Individual::with_id(self.workshop.clone(), values, id));
        }
        self.individuals = individuals;

        let errors = lifecycle::start_all(&mut self.individuals);
        match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    /// One generational step: fold in fresh ratings, rank, breed, swap the
    /// running population. Must only be called on a running population.
    pub fn next(&mut self) -> Result<()> {
        // A failed query aborts only this step; the population stays up and
        // the loop retries after the next interval.
        let rate = self.rating.query()?;
        self.apply_scores(&rate);

        // Stable sort: equal scores keep their prior relative order, so the
        // ranking does not thrash when the service has no fresh data.
        self.individuals
            .sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(std::cmp::Ordering::Equal));
        self.log_scores();

        let next_generation = self.breed();

        // The outgoing generation must be fully stopped before the new one
        // starts: working areas and the server login namespace are reused.
        lifecycle::stop_all(&mut self.individuals);
        self.individuals = next_generation;

        for error in lifecycle::start_all(&mut self.individuals) {
            log::error!("bring-up: {}", error);
        }
        Ok(())
    }

    /// Start, then loop forever: report, sleep out the evaluation window,
    /// step. Step errors are logged, never fatal. Teardown is guaranteed by
    /// `Drop`, so it also runs on panic unwind.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;

        let interval = self.config.generation_interval();
        let mut generation: u64 = 1;
        loop {
            self.report_generation(generation);
            std::thread::sleep(interval);
            if let Err(e) = self.next() {
                log::error!("generation step failed: {}", e);
            }
            generation += 1;
        }
    }

    /// Stop and clean every individual and release the rating service.
    /// Idempotent; safe after a partially failed `start`.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for ind in &mut self.individuals {
            ind.stop_with_clean();
        }
        self.individuals.clear();
        self.rating.stop();
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    fn apply_scores(&mut self, rate: &RateTable) {
        let min_games = f64::from(self.config.min_games);
        for player in rate.iter_players() {
            if player.games() < min_games {
                continue;
            }
            if let Some(ind) = self
                .individuals
                .iter_mut()
                .find(|ind| ind.id() == player.name)
            {
                ind.set_score(player.rate);
            }
        }
    }

    fn breed(&mut self) -> Vec<Individual> {
        let mut next_generation = Vec::with_capacity(self.config.population_size);
        let mut seen = HashSet::new();

        // Elitism: the top genes survive verbatim under a fresh individual.
        for rank in 0..self.config.elite_count {
            let values = self.individuals[rank].values().to_vec();
            let elite = Individual::new(self.workshop.clone(), &self.config.params, values);
            log::info!("elite: {} => {}", self.individuals[rank].id(), elite.id());
            seen.insert(elite.id().to_string());
            next_generation.push(elite);
        }

        // Fresh blood against premature convergence.
        for _ in 0..self.config.random_inject_count {
            loop {
                let values = operators::random_values(&self.config.params, &mut self.rng);
                let ind = Individual::new(self.workshop.clone(), &self.config.params, values);
                if seen.insert(ind.id().to_string()) {
                    log::info!("inject: {}", ind.id());
                    next_generation.push(ind);
                    break;
                }
            }
        }

        let ids: Vec<String> = self.individuals.iter().map(|i| i.id().to_string()).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        while next_generation.len() < self.config.population_size {
            let mut attempts = 0;
            loop {
                attempts += 1;
                if attempts > MAX_CROSSOVER_ATTEMPTS {
                    let values = operators::random_values(&self.config.params, &mut self.rng);
                    let ind =
                        Individual::new(self.workshop.clone(), &self.config.params, values);
                    if seen.insert(ind.id().to_string()) {
                        log::info!("inject: {} (crossover exhausted)", ind.id());
                        next_generation.push(ind);
                        break;
                    }
                    continue;
                }

                let p1 = operators::select_rank(&id_refs, None, &mut self.rng);
                let p2 = operators::select_rank(&id_refs, Some(id_refs[p1]), &mut self.rng);
                let mut values = operators::crossover(
                    self.individuals[p1].values(),
                    self.individuals[p2].values(),
                    &mut self.rng,
                );
                let mutated = self.rng.gen_range(0..self.config.mutation_denominator) == 0;
                if mutated {
                    operators::mutate(&mut values, &self.config.params, &mut self.rng);
                }

                let child = Individual::new(self.workshop.clone(), &self.config.params, values);
                if !seen.insert(child.id().to_string()) {
                    // Duplicate offspring, redraw.
                    continue;
                }
                log::info!(
                    "crossover: {} x {} => {}",
                    id_refs[p1],
                    id_refs[p2],
                    child.id()
                );
                if mutated {
                    log::info!("mutate: {}", child.id());
                }
                next_generation.push(child);
                break;
            }
        }

        next_generation
    }

    pub fn report_generation(&self, generation: u64) {
        log::info!("Generation: {}", generation);
        for ind in &self.individuals {
            let genes: Vec<String> = ind.values().iter().map(i32::to_string).collect();
            log::info!("{} [{}]", ind.id(), genes.join(","));
        }
    }

    fn log_scores(&self) {
        log::info!("Score");
        for ind in &self.individuals {
            log::info!("{} {:.3}", ind.id(), ind.score());
        }
    }
}

impl Drop for GaManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

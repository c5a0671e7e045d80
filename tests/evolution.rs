use enginetune::config::{EvolutionConfig, Param};
use enginetune::error::Result;
use enginetune::ga::{GaManager, FIRST_ELITE_ID};
use enginetune::rating::{PlayerRating, RateTable, RatingSource};
use enginetune::workshop::{WorkerHandle, Workshop};
use enginetune::TunerError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct StubHandle;

impl WorkerHandle for StubHandle {
    fn shutdown(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Workshop that builds nothing and spawns nothing, but keeps count.
#[derive(Default)]
struct StubWorkshop {
    fail_setup_ids: Mutex<Vec<String>>,
    setups: AtomicUsize,
    spawns: AtomicUsize,
    cleans: AtomicUsize,
}

impl Workshop for StubWorkshop {
    fn setup(&self, id: &str, _values: &[i32]) -> Result<()> {
        if self.fail_setup_ids.lock().unwrap().iter().any(|f| f == id) {
            return Err(TunerError::Setup {
                id: id.to_string(),
                reason: "stub failure".to_string(),
            });
        }
        self.setups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn spawn(&self, _id: &str) -> Result<Box<dyn WorkerHandle>> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubHandle))
    }

    fn clean(&self, _id: &str) {
        self.cleans.fetch_add(1, Ordering::SeqCst);
    }
}

/// Rating source answering from a staged queue; empty queue means no data.
#[derive(Default)]
struct StubRating {
    tables: Arc<Mutex<Vec<RateTable>>>,
}

impl RatingSource for StubRating {
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    fn query(&mut self) -> Result<RateTable> {
        let mut tables = self.tables.lock().unwrap();
        if tables.is_empty() {
            Ok(RateTable::default())
        } else {
            Ok(tables.remove(0))
        }
    }

    fn stop(&mut self) {}
}

/// Rating source that fails its first `failures` queries, then answers
/// from the staged queue like `StubRating`.
struct FlakyRating {
    failures: usize,
    tables: Arc<Mutex<Vec<RateTable>>>,
}

impl RatingSource for FlakyRating {
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    fn query(&mut self) -> Result<RateTable> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(TunerError::Rating("rating service unavailable".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.is_empty() {
            Ok(RateTable::default())
        } else {
            Ok(tables.remove(0))
        }
    }

    fn stop(&mut self) {}
}

fn config() -> EvolutionConfig {
    EvolutionConfig {
        params: vec![Param::new("GENE", 5, 0, 10)],
        population_size: 4,
        seed: Some(1),
        ..EvolutionConfig::default()
    }
}

fn rate_table(entries: &[(&str, f64)]) -> RateTable {
    let mut group = HashMap::new();
    for &(name, rate) in entries {
        group.insert(
            name.to_string(),
            PlayerRating {
                name: name.to_string(),
                rate,
                win: 80.0,
                loss: 40.0,
            },
        );
    }
    let mut players = HashMap::new();
    players.insert(1, group);
    RateTable { players }
}

#[test]
fn full_generation_cycle_preserves_the_winner() {
    let workshop = Arc::new(StubWorkshop::default());
    let rating = StubRating::default();
    let tables = rating.tables.clone();

    let mut manager = GaManager::new(config(), workshop.clone(), Box::new(rating)).unwrap();
    manager.start().unwrap();

    assert_eq!(manager.individuals().len(), 4);
    assert_eq!(manager.individuals()[0].id(), FIRST_ELITE_ID);
    assert_eq!(manager.individuals()[0].values(), &[5]);
    assert_eq!(workshop.spawns.load(Ordering::SeqCst), 4);

    // Elite wins the evaluation window, the rest trail.
    let scored: Vec<(String, f64)> = manager
        .individuals()
        .iter()
        .enumerate()
        .map(|(i, ind)| {
            let rate = if ind.id() == FIRST_ELITE_ID { 10.0 } else { 1.0 + i as f64 };
            (ind.id().to_string(), rate)
        })
        .collect();
    let entries: Vec<(&str, f64)> = scored.iter().map(|(id, r)| (id.as_str(), *r)).collect();
    tables.lock().unwrap().push(rate_table(&entries));

    manager.next().unwrap();

    let generation2 = manager.individuals();
    assert_eq!(generation2.len(), 4);
    assert!(generation2.iter().any(|ind| ind.values() == [5]));
    for ind in generation2 {
        assert!(ind.values()[0] >= 0 && ind.values()[0] <= 10);
        assert!(ind.is_running());
    }

    // The full outgoing generation was stopped and cleaned before the swap.
    assert_eq!(workshop.cleans.load(Ordering::SeqCst), 4);
    assert_eq!(workshop.spawns.load(Ordering::SeqCst), 8);
}

#[test]
fn generation_step_survives_an_empty_rating_table() {
    let workshop = Arc::new(StubWorkshop::default());
    let mut manager =
        GaManager::new(config(), workshop, Box::new(StubRating::default())).unwrap();
    manager.start().unwrap();

    manager.next().unwrap();

    let individuals = manager.individuals();
    assert_eq!(individuals.len(), 4);
    assert!(individuals.iter().all(|ind| ind.score() == 0.0));
    // Prior relative order held, so the seeded elite still bred forward.
    assert!(individuals.iter().any(|ind| ind.values() == [5]));
}

#[test]
fn failed_rating_query_aborts_only_that_step() {
    let workshop = Arc::new(StubWorkshop::default());
    let rating = FlakyRating {
        failures: 1,
        tables: Arc::default(),
    };
    let tables = rating.tables.clone();

    let mut manager = GaManager::new(config(), workshop.clone(), Box::new(rating)).unwrap();
    manager.start().unwrap();

    let before: Vec<String> = manager
        .individuals()
        .iter()
        .map(|ind| ind.id().to_string())
        .collect();

    let result = manager.next();
    assert!(matches!(result, Err(TunerError::Rating(_))));

    // The population stayed on its current generation: same individuals,
    // still running, scores untouched, no teardown and no new bring-up.
    let after: Vec<String> = manager
        .individuals()
        .iter()
        .map(|ind| ind.id().to_string())
        .collect();
    assert_eq!(after, before);
    assert!(manager.individuals().iter().all(|ind| ind.is_running()));
    assert!(manager.individuals().iter().all(|ind| ind.score() == 0.0));
    assert_eq!(workshop.spawns.load(Ordering::SeqCst), 4);
    assert_eq!(workshop.cleans.load(Ordering::SeqCst), 0);

    // Once the service recovers, the loop picks up where it left off.
    let scored: Vec<(String, f64)> = manager
        .individuals()
        .iter()
        .map(|ind| {
            let rate = if ind.id() == FIRST_ELITE_ID { 10.0 } else { 1.0 };
            (ind.id().to_string(), rate)
        })
        .collect();
    let entries: Vec<(&str, f64)> = scored.iter().map(|(id, r)| (id.as_str(), *r)).collect();
    tables.lock().unwrap().push(rate_table(&entries));

    manager.next().unwrap();
    assert_eq!(manager.individuals().len(), 4);
    assert!(manager.individuals().iter().any(|ind| ind.values() == [5]));
    assert_eq!(workshop.spawns.load(Ordering::SeqCst), 8);
}

#[test]
fn start_reports_a_setup_failure_but_keeps_siblings_running() {
    let workshop = Arc::new(StubWorkshop::default());
    workshop
        .fail_setup_ids
        .lock()
        .unwrap()
        .push(FIRST_ELITE_ID.to_string());

    let mut manager =
        GaManager::new(config(), workshop.clone(), Box::new(StubRating::default())).unwrap();

    let result = manager.start();
    assert!(matches!(result, Err(TunerError::Setup { id, .. }) if id == FIRST_ELITE_ID));

    assert_eq!(manager.individuals().len(), 4);
    assert_eq!(workshop.setups.load(Ordering::SeqCst), 3);
    assert!(manager
        .individuals()
        .iter()
        .filter(|ind| ind.id() != FIRST_ELITE_ID)
        .all(|ind| ind.is_running()));
}

#[test]
fn drop_tears_the_population_down() {
    let workshop = Arc::new(StubWorkshop::default());
    {
        let mut manager =
            GaManager::new(config(), workshop.clone(), Box::new(StubRating::default())).unwrap();
        manager.start().unwrap();
    }
    assert_eq!(workshop.cleans.load(Ordering::SeqCst), 4);
}

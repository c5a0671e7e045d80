use super::Individual;
use crate::error::TunerError;
use rayon::prelude::*;

/// Bring a batch of individuals up: set every one up in parallel, join,
/// then start them one at a time (sequential start keeps the rating server
/// from being hit by a burst of simultaneous connections).
///
/// Every error is logged and collected, but a failing individual never
/// prevents its siblings from starting.
pub fn start_all(individuals: &mut [Individual]) -> Vec<TunerError> {
    let mut errors: Vec<TunerError> = individuals
        .par_iter_mut()
        .filter_map(|ind| match ind.setup() {
            Ok(()) => None,
            Err(e) => {
                log::error!("{}", e);
                Some(e)
            }
        })
        .collect();

    for ind in individuals.iter_mut() {
        if let Err(e) = ind.start() {
            log::error!("{}", e);
            errors.push(e);
        }
    }

    errors
}

/// Tear a batch down: kill every worker in parallel and wait for each to
/// exit, join, then remove working areas one at a time (parallel kill avoids
/// serialized wait-for-exit latency; sequential clean avoids filesystem
/// contention).
pub fn stop_all(individuals: &mut [Individual]) {
    individuals.par_iter_mut().for_each(Individual::stop);

    for ind in individuals.iter_mut() {
        ind.clean();
    }
}

pub mod server;

pub use server::ShogiServer;

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;

/// One player's standing as reported by the rating service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayerRating {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub win: f64,
    #[serde(default)]
    pub loss: f64,
}

impl PlayerRating {
    pub fn games(&self) -> f64 {
        self.win + self.loss
    }
}

/// Rating output: players grouped by rating group, keyed by identity.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RateTable {
    #[serde(default)]
    pub players: HashMap<i64, HashMap<String, PlayerRating>>,
}

impl RateTable {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn iter_players(&self) -> impl Iterator<Item = &PlayerRating> {
        self.players.values().flat_map(|group| group.values())
    }
}

/// External service supplying per-individual scores. Owned by the engine as
/// a singleton for the whole run; individuals never talk to it directly.
pub trait RatingSource: Send {
    /// Provision the service. Called once before the first generation.
    fn setup(&mut self) -> Result<()>;

    /// Collect the current ratings. Identities absent from the table keep
    /// whatever score they had.
    fn query(&mut self) -> Result<RateTable>;

    /// Tear the service down. Best-effort, never fails.
    fn stop(&mut self);
}

//! Best-score records
//!
//! Two scalars survive between sessions: the Classic high score and the
//! fewest cats used to win Reach the Top. Storage failures are logged and
//! read back as "nothing stored".

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Persisted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    /// Classic high score (0 if none stored)
    pub high_score: u32,
    /// Fewest cats used to win Reach the Top (lower is better)
    pub reach_top_best: Option<u32>,
}

impl HighScores {
    /// Storage key for the Classic high score
    const HIGH_SCORE_KEY: &'static str = "cat_stack_high_score";
    /// Storage key for the Reach-the-Top best
    const BEST_KEY: &'static str = "cat_stack_reach_top_best";

    /// Load both records
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        let records = Self {
            high_score: Self::load_high_score(storage),
            reach_top_best: Self::load_best(storage),
        };
        log::info!(
            "Loaded records: high score {}, best {:?}",
            records.high_score,
            records.reach_top_best
        );
        records
    }

    pub fn load_high_score<S: Storage + ?Sized>(storage: &S) -> u32 {
        Self::read(storage, Self::HIGH_SCORE_KEY).unwrap_or(0)
    }

    pub fn save_high_score<S: Storage + ?Sized>(storage: &mut S, score: u32) {
        Self::write(storage, Self::HIGH_SCORE_KEY, score);
    }

    pub fn load_best<S: Storage + ?Sized>(storage: &S) -> Option<u32> {
        // Zero cats can never win, treat it as garbage
        Self::read(storage, Self::BEST_KEY).filter(|&best| best > 0)
    }

    pub fn save_best<S: Storage + ?Sized>(storage: &mut S, cats_used: u32) {
        Self::write(storage, Self::BEST_KEY, cats_used);
    }

    fn read<S: Storage + ?Sized>(storage: &S, key: &str) -> Option<u32> {
        match storage.get_item(key) {
            Ok(Some(json)) => match serde_json::from_str::<u32>(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Discarding unreadable {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read {}: {}", key, e);
                None
            }
        }
    }

    fn write<S: Storage + ?Sized>(storage: &mut S, key: &str, value: u32) {
        match serde_json::to_string(&value) {
            Ok(json) => {
                if let Err(e) = storage.set_item(key, &json) {
                    log::warn!("Could not save {}: {}", key, e);
                } else {
                    log::info!("Saved {} = {}", key, value);
                }
            }
            Err(e) => log::warn!("Could not encode {}: {}", key, e),
        }
    }
}

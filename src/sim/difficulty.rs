//! Difficulty tiers
//!
//! The tier is a pure projection of the current score. It is recomputed
//! every tick and never stored, so it cannot drift from the score.

use serde::{Deserialize, Serialize};

/// Score at which the game switches to `Normal`
pub const NORMAL_THRESHOLD: u32 = 10;
/// Score at which the game switches to `Hard`
pub const HARD_THRESHOLD: u32 = 20;

/// Named difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Easy,
    Normal,
    Hard,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Normal => "Normal",
            Tier::Hard => "Hard",
        }
    }

    /// Speed, gap and spacing for this tier
    pub fn params(self) -> Difficulty {
        match self {
            Tier::Easy => Difficulty {
                tier: self,
                speed: 3.0,
                gap_size: 180.0,
                spacing: 230.0,
            },
            Tier::Normal => Difficulty {
                tier: self,
                speed: 4.5,
                gap_size: 160.0,
                spacing: 200.0,
            },
            Tier::Hard => Difficulty {
                tier: self,
                speed: 6.0,
                gap_size: 140.0,
                spacing: 160.0,
            },
        }
    }
}

/// Parameters a tier applies to the obstacle course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub tier: Tier,
    /// Leftward obstacle travel (units/tick)
    pub speed: f32,
    /// Height of each new obstacle's gap
    pub gap_size: f32,
    /// Horizontal pitch between consecutive obstacles
    pub spacing: f32,
}

/// Map a score to its difficulty
pub fn difficulty_for(score: u32) -> Difficulty {
    let tier = if score >= HARD_THRESHOLD {
        Tier::Hard
    } else if score >= NORMAL_THRESHOLD {
        Tier::Normal
    } else {
        Tier::Easy
    };
    tier.params()
}

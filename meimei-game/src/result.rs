//! End-of-journey summary and rank badges.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GuessModel;

const DEFAULT_RANK_DATA: &str = include_str!("../data/ranks.json");

/// Letter badge awarded for a finished journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    A,
    B,
    C,
    D,
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::A => write!(f, "A"),
            Rank::B => write!(f, "B"),
            Rank::C => write!(f, "C"),
            Rank::D => write!(f, "D"),
        }
    }
}

/// A rank awarded when the journey took at most `max_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBand {
    pub max_days: u32,
    pub rank: Rank,
    pub headline: String,
}

/// Rank bands, checked in order, plus the badge for anything slower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(default)]
    pub bands: Vec<RankBand>,
    #[serde(default = "RankConfig::default_fallback_rank")]
    pub fallback_rank: Rank,
    #[serde(default = "RankConfig::default_fallback_headline")]
    pub fallback_headline: String,
}

/// Errors raised when rank configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankConfigError {
    #[error("rank bands must be strictly ascending (band {index} has {max_days} days after {previous})")]
    NotAscending {
        index: usize,
        previous: u32,
        max_days: u32,
    },
    #[error("rank config defines no bands")]
    NoBands,
    #[error("failed to parse rank config: {0}")]
    Parse(String),
}

impl RankConfig {
    const fn default_fallback_rank() -> Rank {
        Rank::D
    }

    fn default_fallback_headline() -> String {
        String::from("Journey Complete!")
    }

    /// Parse and validate a rank configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, has no bands, or the bands are
    /// not ascending.
    pub fn from_json(json: &str) -> Result<Self, RankConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| RankConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns an error if there are no bands or a band's day limit does not
    /// exceed the previous one.
    pub fn validate(&self) -> Result<(), RankConfigError> {
        if self.bands.is_empty() {
            return Err(RankConfigError::NoBands);
        }
        for (index, pair) in self.bands.windows(2).enumerate() {
            if pair[1].max_days <= pair[0].max_days {
                return Err(RankConfigError::NotAscending {
                    index: index + 1,
                    previous: pair[0].max_days,
                    max_days: pair[1].max_days,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_RANK_DATA).unwrap_or_else(|err| {
            log::warn!("bundled rank config rejected ({err}); using built-in bands");
            Self::builtin()
        })
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    fn builtin() -> Self {
        let band = |max_days, rank, headline: &str| RankBand {
            max_days,
            rank,
            headline: headline.to_string(),
        };
        Self {
            bands: vec![
                band(10, Rank::A, "Faster than Grandma!"),
                band(15, Rank::B, "Great Trip!"),
                band(20, Rank::C, "Good Effort!"),
            ],
            fallback_rank: Self::default_fallback_rank(),
            fallback_headline: Self::default_fallback_headline(),
        }
    }

    /// Badge for a journey that took `days`.
    #[must_use]
    pub fn rank_for(&self, days: u32) -> (Rank, &str) {
        self.bands
            .iter()
            .find(|band| days <= band.max_days)
            .map_or((self.fallback_rank, self.fallback_headline.as_str()), |band| {
                (band.rank, band.headline.as_str())
            })
    }
}

impl Default for RankConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Totals for a finished (or abandoned) journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySummary {
    pub days_travelled: u32,
    pub locations_found: usize,
    pub location_count: usize,
    pub total_guesses: usize,
    pub incorrect_guesses: usize,
    pub rank: Rank,
    pub headline: String,
}

/// Summarize the model's current totals under `cfg`.
#[must_use]
pub fn journey_summary(model: &GuessModel, cfg: &RankConfig) -> JourneySummary {
    let history = model.click_history();
    let locations_found = history.iter().filter(|record| record.was_correct).count();
    let days_travelled = model.days_travelled();
    let (rank, headline) = cfg.rank_for(days_travelled);
    JourneySummary {
        days_travelled,
        locations_found,
        location_count: model.location_count(),
        total_guesses: history.len(),
        incorrect_guesses: history.len() - locations_found,
        rank,
        headline: headline.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Location, LocationCatalog};
    use crate::geometry::Point;

    #[test]
    fn bundled_bands_match_badges() {
        let cfg = RankConfig::default_config();
        assert_eq!(cfg.rank_for(0).0, Rank::A);
        assert_eq!(cfg.rank_for(10), (Rank::A, "Faster than Grandma!"));
        assert_eq!(cfg.rank_for(11).0, Rank::B);
        assert_eq!(cfg.rank_for(15).0, Rank::B);
        assert_eq!(cfg.rank_for(20), (Rank::C, "Good Effort!"));
        assert_eq!(cfg.rank_for(21), (Rank::D, "Journey Complete!"));
    }

    #[test]
    fn rejects_descending_bands() {
        let json = r#"{
            "bands": [
                { "max_days": 10, "rank": "a", "headline": "x" },
                { "max_days": 10, "rank": "b", "headline": "y" }
            ]
        }"#;
        assert_eq!(
            RankConfig::from_json(json),
            Err(RankConfigError::NotAscending {
                index: 1,
                previous: 10,
                max_days: 10
            })
        );
        assert!(matches!(
            RankConfig::from_json("not json"),
            Err(RankConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_config_without_bands() {
        assert_eq!(RankConfig::from_json("{}"), Err(RankConfigError::NoBands));
        assert_eq!(RankConfig::from_json("[]"), Err(RankConfigError::NoBands));
        assert_eq!(
            RankConfig::from_json(r#"{ "bands": [] }"#),
            Err(RankConfigError::NoBands)
        );
    }

    #[test]
    fn summary_counts_guesses() {
        let catalog = LocationCatalog::new(vec![Location::new(
            Point::new(50.0, 50.0),
            10.0,
            "h",
            "c",
            "k",
        )])
        .unwrap();
        let mut model = GuessModel::new(catalog);
        model.record_click(Point::new(0.0, 0.0), false);
        model.record_click(Point::new(50.0, 52.0), true);

        let summary = journey_summary(&model, &RankConfig::default_config());
        assert_eq!(summary.days_travelled, 2);
        assert_eq!(summary.locations_found, 1);
        assert_eq!(summary.total_guesses, 2);
        assert_eq!(summary.incorrect_guesses, 1);
        assert_eq!(summary.rank, Rank::A);
        assert_eq!(summary.rank.to_string(), "A");
    }
}

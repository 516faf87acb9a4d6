//! Engine configuration

use crate::{AspectKind, CelestialBody, ConfigError, ASHTAKOOT_MAX_POINTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunable parts of the scoring policy. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How the headline compatibility score is derived
    pub overall_score: OverallScorePolicy,

    /// Where the ashtakoot points come from
    pub ashtakoot: AshtakootMode,

    /// Aspect tolerances
    pub orbs: OrbConfig,
}

/// Aspect tolerances in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub conjunction: f64,
    pub sextile: f64,
    pub square: f64,
    pub trine: f64,
    pub opposition: f64,

    /// Subtracted when neither body is the Sun or the Moon
    pub non_luminary_reduction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallScorePolicy {
    /// Highest of the five dimension scores
    #[default]
    MaxDimension,
    /// Nakshatra relationship score
    RelationshipScore,
    /// Aspect-weighted formula, base 40
    AspectWeighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AshtakootMode {
    /// Same points for every pair
    Fixed { points: u32 },
    /// Eight kutas from the two Moons
    Computed,
}

impl Default for AshtakootMode {
    fn default() -> Self {
        AshtakootMode::Fixed { points: 25 }
    }
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            conjunction: 8.0,
            sextile: 5.0,
            square: 7.0,
            trine: 7.0,
            opposition: 8.0,
            non_luminary_reduction: 1.0,
        }
    }
}

impl OrbConfig {
    /// Tight orbs for charts with an uncertain birth time
    pub fn strict() -> Self {
        Self {
            conjunction: 6.0,
            sextile: 4.0,
            square: 5.0,
            trine: 5.0,
            opposition: 6.0,
            non_luminary_reduction: 1.0,
        }
    }

    pub fn base(&self, kind: AspectKind) -> f64 {
        match kind {
            AspectKind::Conjunction => self.conjunction,
            AspectKind::Sextile => self.sextile,
            AspectKind::Square => self.square,
            AspectKind::Trine => self.trine,
            AspectKind::Opposition => self.opposition,
        }
    }

    /// Allowed orb for `kind` between the two bodies.
    pub fn tolerance(&self, kind: AspectKind, planet1: CelestialBody, planet2: CelestialBody) -> f64 {
        if planet1.is_luminary() || planet2.is_luminary() {
            self.base(kind)
        } else {
            self.base(kind) - self.non_luminary_reduction
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overall_score: OverallScorePolicy::MaxDimension,
            ashtakoot: AshtakootMode::default(),
            orbs: OrbConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Tighter orbs and real kuta points
    pub fn strict() -> Self {
        Self {
            overall_score: OverallScorePolicy::MaxDimension,
            ashtakoot: AshtakootMode::Computed,
            orbs: OrbConfig::strict(),
        }
    }

    /// Headline score taken straight from the nakshatra relationship
    pub fn legacy() -> Self {
        Self {
            overall_score: OverallScorePolicy::RelationshipScore,
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let reduction = self.orbs.non_luminary_reduction;
        if !reduction.is_finite() || reduction < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "non_luminary_reduction must be a non-negative number, got {}",
                reduction
            )));
        }
        for kind in AspectKind::ALL {
            let orb = self.orbs.base(kind);
            if !orb.is_finite() || orb - reduction <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} orb must stay positive after the non-luminary reduction, got {}",
                    kind, orb
                )));
            }
        }
        if let AshtakootMode::Fixed { points } = self.ashtakoot {
            if points > ASHTAKOOT_MAX_POINTS {
                return Err(ConfigError::Invalid(format!(
                    "ashtakoot points must be at most {}, got {}",
                    ASHTAKOOT_MAX_POINTS, points
                )));
            }
        }
        Ok(())
    }
}

//! Synastry compatibility scoring.
//!
//! Takes two charts worth of ecliptic longitudes (see [`ChartPositions`]) and produces a
//! [`SynastryReport`]: the nakshatra relationship between the two Moons, the filtered
//! cross-chart aspects, the planetary energy interaction, five relationship dimensions and
//! an overall compatibility score.
//!
//! ```
//! use aztro_synastry::{CelestialBody, ChartSnapshot, SynastryEngine};
//!
//! let chart1 = ChartSnapshot::new()
//!     .with_planet(CelestialBody::Sun, 123.0)
//!     .with_planet(CelestialBody::Moon, 5.0);
//! let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 245.0);
//!
//! let engine = SynastryEngine::default();
//! let report = engine.analyze(&chart1, &chart2).unwrap();
//! assert!((0.0..=100.0).contains(&report.compatibility_score));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod aspects;
mod chart;
mod compatibility;
pub mod config;
mod dimensions;
mod energy;
mod kuta;
mod nakshatra;
mod report;

pub use aspects::{angular_separation, is_valid_aspect, match_aspect, Aspect, AspectRule, KEY_COMBINATIONS};
pub use chart::{ChartPositions, ChartSnapshot};
pub use compatibility::{
    aspect_weighted_score, compatibility_level, house_placements, summary_sentence, HousePlacement,
};
pub use config::{AshtakootMode, EngineConfig, OrbConfig, OverallScorePolicy};
pub use dimensions::{score_dimensions, Dimension, DimensionScore, DimensionScores, ScoreLabel};
pub use energy::EnergyInteraction;
pub use kuta::{calculate_ashtakoot, AshtakootBreakdown, ASHTAKOOT_MAX_POINTS};
pub use nakshatra::{
    has_rajju_dosha, has_vedha_dosha, is_mahendra, nakshatra_interval, nakshatra_of, D9Position,
    Gana, Nadi, NakshatraCompatibility, NakshatraRelationship, PersonNakshatra, Rajju, Yoni,
    NAKSHATRA_SPAN,
};
pub use report::{AspectRecord, SynastryRecord, SynastryReport, SynastryResponse};

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CelestialBody {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 10] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mercury,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn iter() -> impl Iterator<Item = CelestialBody> {
        CelestialBody::ALL.iter().copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Uranus => "Uranus",
            CelestialBody::Neptune => "Neptune",
            CelestialBody::Pluto => "Pluto",
        }
    }

    /// Sun and Moon get the full aspect orb.
    pub fn is_luminary(&self) -> bool {
        matches!(self, CelestialBody::Sun | CelestialBody::Moon)
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    First = 1,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
    Ninth,
    Tenth,
    Eleventh,
    Twelfth,
}

impl House {
    pub fn from_index(index: usize) -> Option<House> {
        match index {
            1 => Some(House::First),
            2 => Some(House::Second),
            3 => Some(House::Third),
            4 => Some(House::Fourth),
            5 => Some(House::Fifth),
            6 => Some(House::Sixth),
            7 => Some(House::Seventh),
            8 => Some(House::Eighth),
            9 => Some(House::Ninth),
            10 => Some(House::Tenth),
            11 => Some(House::Eleventh),
            12 => Some(House::Twelfth),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// "7th", "1st", "2nd", "3rd". Only the first three houses take a special suffix.
    pub fn ordinal(&self) -> String {
        let suffix = match self {
            House::First => "st",
            House::Second => "nd",
            House::Third => "rd",
            _ => "th",
        };
        format!("{}{}", self.number(), suffix)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn from_longitude(longitude: f64) -> Self {
        let normalized_longitude = longitude.rem_euclid(360.0);
        let sign_index = (normalized_longitude / 30.0).floor() as usize;
        ZodiacSign::ALL[sign_index.min(11)]
    }

    /// 1 = Aries ... 12 = Pisces. Out of range numbers wrap around.
    pub fn from_number(number: u8) -> Self {
        ZodiacSign::ALL[(number as usize + 11) % 12]
    }

    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    /// Ruler label used by the navamsa (D9) comparison. Modern co-rulers are kept in the
    /// label, so Scorpio ("Mars/Pluto") does not match Aries ("Mars").
    pub fn d9_ruler(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Mars",
            ZodiacSign::Taurus => "Venus",
            ZodiacSign::Gemini => "Mercury",
            ZodiacSign::Cancer => "Moon",
            ZodiacSign::Leo => "Sun",
            ZodiacSign::Virgo => "Mercury",
            ZodiacSign::Libra => "Venus",
            ZodiacSign::Scorpio => "Mars/Pluto",
            ZodiacSign::Sagittarius => "Jupiter",
            ZodiacSign::Capricorn => "Saturn",
            ZodiacSign::Aquarius => "Saturn/Uranus",
            ZodiacSign::Pisces => "Jupiter/Neptune",
        }
    }

    /// Traditional sign lord.
    pub fn lord(&self) -> CelestialBody {
        match self {
            ZodiacSign::Aries | ZodiacSign::Scorpio => CelestialBody::Mars,
            ZodiacSign::Taurus | ZodiacSign::Libra => CelestialBody::Venus,
            ZodiacSign::Gemini | ZodiacSign::Virgo => CelestialBody::Mercury,
            ZodiacSign::Cancer => CelestialBody::Moon,
            ZodiacSign::Leo => CelestialBody::Sun,
            ZodiacSign::Sagittarius | ZodiacSign::Pisces => CelestialBody::Jupiter,
            ZodiacSign::Capricorn | ZodiacSign::Aquarius => CelestialBody::Saturn,
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign_str = match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        };
        write!(f, "{}", sign_str)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nakshatra {
    Ashwini = 1,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Moola,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    pub fn angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }

    pub fn quality(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Strong",
            AspectKind::Sextile => "Friendly",
            AspectKind::Square => "Challenging",
            AspectKind::Trine => "Harmonious",
            AspectKind::Opposition => "Polarizing",
        }
    }

    pub fn influence(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Strong connection, merging energies",
            AspectKind::Sextile => "Harmonious opportunity, ease of expression",
            AspectKind::Square => "Tension, challenge, potential for growth",
            AspectKind::Trine => "Flow, harmony, ease",
            AspectKind::Opposition => "Polarity, balance, awareness of the other",
        }
    }

    /// Trine, sextile and conjunction.
    pub fn is_favorable(&self) -> bool {
        matches!(
            self,
            AspectKind::Conjunction | AspectKind::Sextile | AspectKind::Trine
        )
    }

    /// Square and opposition.
    pub fn is_challenging(&self) -> bool {
        matches!(self, AspectKind::Square | AspectKind::Opposition)
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The six nakshatra relationship categories, in tie-breaking order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    SoulConnection,
    KarmicBond,
    MutualGrowth,
    FriendlyBonds,
    BindingForces,
    DynamicTension,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntensityTier {
    Near,
    Moderate,
    Far,
    Fixed,
}

// ---------------------------
// ## Engine
// ---------------------------

/// Entry point for synastry analysis. Holds only configuration, so one engine can be
/// shared across threads and reused for any number of chart pairs.
#[derive(Debug, Clone, Default)]
pub struct SynastryEngine {
    config: EngineConfig,
}

impl SynastryEngine {
    pub fn new(config: EngineConfig) -> Self {
        SynastryEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynastryError {
    #[error("Invalid longitude for {body} in chart {chart}: {value}")]
    InvalidLongitude {
        chart: u8,
        body: CelestialBody,
        value: f64,
    },
    #[error("Invalid house cusp {index} in chart {chart}: {value}")]
    InvalidHouseCusp { chart: u8, index: usize, value: f64 },
    #[error("Chart {chart} has {count} house cusps, expected 12")]
    HouseCuspCount { chart: u8, count: usize },
    /// Handled inside the engine, never returned from [`SynastryEngine::analyze`].
    #[error("{body} is missing from chart {chart}")]
    MissingBody { chart: u8, body: CelestialBody },
    #[error("Chart error: {0}")]
    Chart(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

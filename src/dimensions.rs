use super::*;

pub const DIMENSION_BASE_SCORE: f64 = 50.0;

// Per-aspect weights
const HARMONY_FLOWING: f64 = 3.0;
const HARMONY_OPPOSITION: f64 = -2.0;
const HARMONY_SQUARE: f64 = -3.0;
const HARMONY_MOON_FAVORABLE: f64 = 4.0;
const HARMONY_MERCURY_JUPITER: f64 = 5.0;
const INTIMACY_MOON_VENUS_FAVORABLE: f64 = 4.0;
const INTIMACY_MOON_VENUS_SQUARE: f64 = -2.0;
const INTIMACY_SUN_MOON: f64 = 6.0;
const PASSION_VENUS_MARS_FAVORABLE: f64 = 8.0;
const PASSION_VENUS_MARS_SQUARE: f64 = 5.0;
const PASSION_VENUS_MARS_OPPOSITION: f64 = 4.0;
const PASSION_MARS_PLUTO: f64 = 6.0;
const GROWTH_CHALLENGE: f64 = 3.0;
const GROWTH_SATURN_FLOWING: f64 = 4.0;
const GROWTH_SATURN_OTHER: f64 = 2.0;
const GROWTH_JUPITER_FAVORABLE: f64 = 3.0;

// Nakshatra layer
const NEAR_TIER_ALL: f64 = 5.0;
const FAR_TIER_ALL: f64 = -3.0;
const D9_CONCORD: [f64; 5] = [8.0, 6.0, 0.0, 0.0, 7.0];

// Ashtakoot layer
const ASHTAKOOT_HIGH: u32 = 20;
const ASHTAKOOT_MEDIUM: u32 = 16;
const ASHTAKOOT_HIGH_BONUS: [f64; 5] = [8.0, 6.0, 0.0, 0.0, 0.0];
const ASHTAKOOT_MEDIUM_BONUS: [f64; 5] = [4.0, 3.0, 0.0, 0.0, 0.0];
const VEDHA_EFFECT: [f64; 5] = [-6.0, 0.0, 0.0, 0.0, 3.0];
const RAJJU_EFFECT: [f64; 5] = [0.0, -5.0, 0.0, 4.0, 0.0];
const MAHENDRA_EFFECT: [f64; 5] = [4.0, 0.0, 0.0, 0.0, 8.0];

/// (first body, second body, per-dimension weight of the energy strength)
const ENERGY_PAIRS: [(CelestialBody, CelestialBody, [f64; 5]); 4] = [
    (CelestialBody::Saturn, CelestialBody::Jupiter, [0.0, 0.0, 0.0, 0.8, 0.5]),
    (CelestialBody::Mars, CelestialBody::Venus, [0.0, 0.7, 1.2, 0.0, 0.0]),
    (CelestialBody::Moon, CelestialBody::Sun, [1.0, 1.0, 0.0, 0.0, 0.0]),
    (CelestialBody::Mercury, CelestialBody::Mars, [0.0, 0.0, 0.6, 0.8, 0.0]),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Harmony,
    Intimacy,
    Passion,
    Growth,
    KarmicBond,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Harmony,
        Dimension::Intimacy,
        Dimension::Passion,
        Dimension::Growth,
        Dimension::KarmicBond,
    ];

    pub fn description(&self, score: f64) -> &'static str {
        let bracket = match score {
            s if s >= 80.0 => 0,
            s if s >= 65.0 => 1,
            s if s >= 50.0 => 2,
            s if s >= 35.0 => 3,
            _ => 4,
        };
        let sentences: [&str; 5] = match self {
            Dimension::Harmony => [
                "Your relationship flows with exceptional ease. Communication is natural and you understand each other without effort.",
                "Your relationship has a harmonious quality with good flow in daily interactions and shared activities.",
                "Your relationship has moderate harmony with a balance of smooth and challenging interactions.",
                "Your relationship may face communication challenges that require conscious attention to overcome.",
                "Your relationship has significant harmony challenges that can lead to frequent misunderstandings.",
            ],
            Dimension::Intimacy => [
                "Your relationship has profound emotional closeness with deep understanding and trust.",
                "Your relationship fosters good emotional intimacy with strong bonds of affection.",
                "Your relationship has moderate emotional intimacy with some areas of deep connection.",
                "Your relationship may struggle with emotional intimacy at times, requiring effort to maintain closeness.",
                "Your relationship faces challenges in developing and maintaining emotional intimacy.",
            ],
            Dimension::Passion => [
                "Your relationship has powerful magnetic attraction and intense chemistry.",
                "Your relationship has strong attraction and good chemistry that enlivens your connection.",
                "Your relationship has moderate passion with periods of stronger attraction and chemistry.",
                "Your relationship may experience fluctuating levels of attraction and chemistry.",
                "Your relationship may lack natural chemistry, requiring effort to maintain attraction.",
            ],
            Dimension::Growth => [
                "Your relationship offers exceptional opportunities for personal development and transformation.",
                "Your relationship provides strong growth potential through supporting each other's evolution.",
                "Your relationship offers moderate growth opportunities through both support and challenges.",
                "Your relationship presents growth challenges that require conscious engagement to benefit from.",
                "Your relationship contains difficult growth lessons that may feel overwhelming at times.",
            ],
            Dimension::KarmicBond => [
                "Your relationship has profound soul recognition with a deep sense of familiarity and purpose.",
                "Your relationship has strong karmic ties that feel meaningful and significant.",
                "Your relationship has moderate karmic connections with some sense of familiarity.",
                "Your relationship may have karmic lessons to work through together.",
                "Your relationship may involve challenging karmic patterns that require conscious resolution.",
            ],
        };
        sentences[bracket]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Excellent,
    VeryGood,
    Good,
    Average,
    Challenging,
    Difficult,
}

impl ScoreLabel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ScoreLabel::Excellent,
            s if s >= 65.0 => ScoreLabel::VeryGood,
            s if s >= 50.0 => ScoreLabel::Good,
            s if s >= 35.0 => ScoreLabel::Average,
            s if s >= 20.0 => ScoreLabel::Challenging,
            _ => ScoreLabel::Difficult,
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::VeryGood => "Very Good",
            ScoreLabel::Good => "Good",
            ScoreLabel::Average => "Average",
            ScoreLabel::Challenging => "Challenging",
            ScoreLabel::Difficult => "Difficult",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: f64,
    pub label: ScoreLabel,
    pub description: String,
}

impl DimensionScore {
    fn new(dimension: Dimension, raw: f64) -> Self {
        let score = raw.clamp(0.0, 100.0);
        DimensionScore {
            dimension,
            score,
            label: ScoreLabel::from_score(score),
            description: dimension.description(score).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub harmony: DimensionScore,
    pub intimacy: DimensionScore,
    pub passion: DimensionScore,
    pub growth: DimensionScore,
    pub karmic_bond: DimensionScore,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::Harmony => &self.harmony,
            Dimension::Intimacy => &self.intimacy,
            Dimension::Passion => &self.passion,
            Dimension::Growth => &self.growth,
            Dimension::KarmicBond => &self.karmic_bond,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionScore> {
        Dimension::ALL.into_iter().map(move |d| self.get(d))
    }

    pub fn max_score(&self) -> f64 {
        self.iter().map(|d| d.score).fold(0.0, f64::max)
    }
}

impl RelationshipType {
    /// Harmony, intimacy, passion, growth and karmic bond adjustments for the category.
    pub fn dimension_vector(&self) -> [f64; 5] {
        match self {
            RelationshipType::SoulConnection => [10.0, 8.0, 0.0, 0.0, 15.0],
            RelationshipType::MutualGrowth => [8.0, 0.0, 0.0, 12.0, 5.0],
            RelationshipType::FriendlyBonds => [7.0, 4.0, 0.0, 6.0, 0.0],
            RelationshipType::KarmicBond => [0.0, 0.0, 3.0, 8.0, 20.0],
            RelationshipType::BindingForces => [-5.0, 0.0, 5.0, 10.0, 8.0],
            RelationshipType::DynamicTension => [-8.0, 0.0, 10.0, 7.0, 6.0],
        }
    }
}

struct Tally([f64; 5]);

impl Tally {
    fn add(&mut self, dimension: Dimension, amount: f64) {
        self.0[dimension as usize] += amount;
    }

    fn add_all(&mut self, amounts: [f64; 5]) {
        for (value, amount) in self.0.iter_mut().zip(amounts) {
            *value += amount;
        }
    }

    fn add_aspect(&mut self, aspect: &Aspect) {
        use CelestialBody::*;
        let kind = aspect.kind;
        let favorable = kind.is_favorable();

        match kind {
            AspectKind::Trine | AspectKind::Sextile => self.add(Dimension::Harmony, HARMONY_FLOWING),
            AspectKind::Opposition => self.add(Dimension::Harmony, HARMONY_OPPOSITION),
            AspectKind::Square => self.add(Dimension::Harmony, HARMONY_SQUARE),
            AspectKind::Conjunction => {}
        }
        if aspect.involves(Moon) && favorable {
            self.add(Dimension::Harmony, HARMONY_MOON_FAVORABLE);
        }
        if aspect.connects(Mercury, Jupiter) && favorable {
            self.add(Dimension::Harmony, HARMONY_MERCURY_JUPITER);
        }

        if aspect.involves(Moon) || aspect.involves(Venus) {
            if favorable {
                self.add(Dimension::Intimacy, INTIMACY_MOON_VENUS_FAVORABLE);
            } else if kind == AspectKind::Square {
                self.add(Dimension::Intimacy, INTIMACY_MOON_VENUS_SQUARE);
            }
        }
        if aspect.connects(Sun, Moon) && favorable {
            self.add(Dimension::Intimacy, INTIMACY_SUN_MOON);
        }

        if aspect.connects(Venus, Mars) {
            let passion = match kind {
                AspectKind::Square => PASSION_VENUS_MARS_SQUARE,
                AspectKind::Opposition => PASSION_VENUS_MARS_OPPOSITION,
                _ => PASSION_VENUS_MARS_FAVORABLE,
            };
            self.add(Dimension::Passion, passion);
        }
        if aspect.connects(Mars, Pluto) {
            self.add(Dimension::Passion, PASSION_MARS_PLUTO);
        }

        if kind.is_challenging() {
            self.add(Dimension::Growth, GROWTH_CHALLENGE);
        }
        if aspect.involves(Saturn) {
            let growth = match kind {
                AspectKind::Trine | AspectKind::Sextile => GROWTH_SATURN_FLOWING,
                _ => GROWTH_SATURN_OTHER,
            };
            self.add(Dimension::Growth, growth);
        }
        if aspect.involves(Jupiter) && favorable {
            self.add(Dimension::Growth, GROWTH_JUPITER_FAVORABLE);
        }
    }

    fn add_relationship(&mut self, relationship: &NakshatraRelationship) {
        self.add_all(relationship.relationship_type.dimension_vector());

        match relationship.tier {
            IntensityTier::Near => self.add_all([NEAR_TIER_ALL; 5]),
            IntensityTier::Far => self.add_all([FAR_TIER_ALL; 5]),
            _ => {}
        }

        if relationship.d9_concord {
            self.add_all(D9_CONCORD);
        }

        let energy = &relationship.energy;
        let strength = energy.strength as f64;
        for (a, b, weights) in ENERGY_PAIRS {
            if energy.involves(a) && energy.involves(b) {
                self.add_all(weights.map(|w| w * strength));
            }
        }
    }

    fn add_compatibility(&mut self, compatibility: Option<&NakshatraCompatibility>) {
        let Some(compatibility) = compatibility else {
            return;
        };
        if compatibility.ashtakoot_points >= ASHTAKOOT_HIGH {
            self.add_all(ASHTAKOOT_HIGH_BONUS);
        } else if compatibility.ashtakoot_points >= ASHTAKOOT_MEDIUM {
            self.add_all(ASHTAKOOT_MEDIUM_BONUS);
        }
        if compatibility.vedha_dosha {
            self.add_all(VEDHA_EFFECT);
        }
        if compatibility.rajju_dosha {
            self.add_all(RAJJU_EFFECT);
        }
        if compatibility.mahendra {
            self.add_all(MAHENDRA_EFFECT);
        }
    }
}

/// Five relationship dimensions. Every layer is summed before the single clamp to [0, 100].
/// The compatibility layer is skipped when there is no compatibility record.
pub fn score_dimensions(
    aspects: &[Aspect],
    relationship: &NakshatraRelationship,
    compatibility: Option<&NakshatraCompatibility>,
) -> DimensionScores {
    let mut tally = Tally([DIMENSION_BASE_SCORE; 5]);
    for aspect in aspects {
        tally.add_aspect(aspect);
    }
    tally.add_relationship(relationship);
    tally.add_compatibility(compatibility);

    let [harmony, intimacy, passion, growth, karmic_bond] = tally.0;
    DimensionScores {
        harmony: DimensionScore::new(Dimension::Harmony, harmony),
        intimacy: DimensionScore::new(Dimension::Intimacy, intimacy),
        passion: DimensionScore::new(Dimension::Passion, passion),
        growth: DimensionScore::new(Dimension::Growth, growth),
        karmic_bond: DimensionScore::new(Dimension::KarmicBond, karmic_bond),
    }
}

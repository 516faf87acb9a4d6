use super::*;
use tracing::{debug, warn};

pub const NAKSHATRA_SPAN: f64 = 360.0 / 27.0;
const D9_SPAN: f64 = 30.0 / 9.0;

const NEAR_TIER_BONUS: i32 = 10;
const FAR_TIER_PENALTY: i32 = 10;
const D9_CONCORD_BONUS: i32 = 10;

const MAHENDRA_DISTANCES: [u8; 8] = [4, 7, 10, 13, 16, 19, 22, 25];

const DEVA: [u8; 9] = [1, 5, 7, 8, 13, 15, 17, 22, 27];
const MANUSHYA: [u8; 9] = [2, 4, 6, 11, 12, 20, 21, 25, 26];

const VATA: [u8; 9] = [1, 6, 7, 12, 13, 18, 19, 24, 25];
const PITTA: [u8; 9] = [2, 5, 8, 11, 14, 17, 20, 23, 26];

const RAJJU_FEET: [u8; 6] = [1, 9, 10, 18, 19, 27];
const RAJJU_HIP: [u8; 6] = [2, 8, 11, 17, 20, 26];
const RAJJU_NECK: [u8; 6] = [3, 7, 12, 16, 21, 25];
const RAJJU_NAVEL: [u8; 6] = [4, 6, 13, 15, 22, 24];

/// Obstructing partners, indexed by nakshatra number - 1.
const VEDHA: [&[u8]; 27] = [
    &[18],
    &[17],
    &[16],
    &[15],
    &[14, 23],
    &[22],
    &[21],
    &[20],
    &[19],
    &[27],
    &[26],
    &[25],
    &[24],
    &[5, 23],
    &[4],
    &[3],
    &[2],
    &[1],
    &[9],
    &[8],
    &[7],
    &[6],
    &[5, 14],
    &[13],
    &[12],
    &[11],
    &[10],
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gana {
    Deva,
    Manushya,
    Rakshasa,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nadi {
    Vata,
    Pitta,
    Kapha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rajju {
    Feet,
    Hip,
    Neck,
    Navel,
    Head,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Yoni {
    Horse,
    Elephant,
    Sheep,
    Snake,
    Dog,
    Cat,
    Rat,
    Cow,
    Buffalo,
    Tiger,
    Hare,
    Monkey,
    Mongoose,
    Lion,
}

impl Yoni {
    /// Yoni animals that are sworn enemies score nothing.
    pub fn is_enemy_of(&self, other: Yoni) -> bool {
        const ENEMIES: [(Yoni, Yoni); 7] = [
            (Yoni::Horse, Yoni::Buffalo),
            (Yoni::Elephant, Yoni::Lion),
            (Yoni::Sheep, Yoni::Monkey),
            (Yoni::Snake, Yoni::Mongoose),
            (Yoni::Dog, Yoni::Hare),
            (Yoni::Cat, Yoni::Rat),
            (Yoni::Cow, Yoni::Tiger),
        ];
        ENEMIES
            .iter()
            .any(|&(a, b)| (a == *self && b == other) || (a == other && b == *self))
    }
}

/// 1-based nakshatra number of a longitude.
pub fn nakshatra_of(longitude: f64) -> u8 {
    let normalized_longitude = longitude.rem_euclid(360.0);
    let index = (normalized_longitude / NAKSHATRA_SPAN).floor() as i64 + 1;
    index.clamp(1, 27) as u8
}

/// Forward distance from `from` to `to`, counted 1..=27. Equal nakshatras are 27 apart.
pub fn nakshatra_interval(from: u8, to: u8) -> u8 {
    let diff = (to as i32 - from as i32 - 1).rem_euclid(27);
    (diff + 1) as u8
}

pub fn has_vedha_dosha(n1: u8, n2: u8) -> bool {
    let obstructs = |a: u8, b: u8| {
        VEDHA
            .get(a as usize - 1)
            .map_or(false, |partners| partners.contains(&b))
    };
    (1..=27).contains(&n1) && (1..=27).contains(&n2) && (obstructs(n1, n2) || obstructs(n2, n1))
}

pub fn has_rajju_dosha(n1: u8, n2: u8) -> bool {
    Nakshatra::from_number(n1).map(|n| n.rajju()) == Nakshatra::from_number(n2).map(|n| n.rajju())
}

pub fn is_mahendra(n1: u8, n2: u8) -> bool {
    let diff = match (n1 as i32 - n2 as i32).rem_euclid(27) {
        0 => 27,
        d => d as u8,
    };
    MAHENDRA_DISTANCES.contains(&diff)
}

impl Nakshatra {
    const ALL: [Nakshatra; 27] = [
        Nakshatra::Ashwini,
        Nakshatra::Bharani,
        Nakshatra::Krittika,
        Nakshatra::Rohini,
        Nakshatra::Mrigashira,
        Nakshatra::Ardra,
        Nakshatra::Punarvasu,
        Nakshatra::Pushya,
        Nakshatra::Ashlesha,
        Nakshatra::Magha,
        Nakshatra::PurvaPhalguni,
        Nakshatra::UttaraPhalguni,
        Nakshatra::Hasta,
        Nakshatra::Chitra,
        Nakshatra::Swati,
        Nakshatra::Vishakha,
        Nakshatra::Anuradha,
        Nakshatra::Jyeshtha,
        Nakshatra::Moola,
        Nakshatra::PurvaAshadha,
        Nakshatra::UttaraAshadha,
        Nakshatra::Shravana,
        Nakshatra::Dhanishta,
        Nakshatra::Shatabhisha,
        Nakshatra::PurvaBhadrapada,
        Nakshatra::UttaraBhadrapada,
        Nakshatra::Revati,
    ];

    pub fn from_number(number: u8) -> Option<Nakshatra> {
        Nakshatra::ALL.get((number as usize).checked_sub(1)?).copied()
    }

    pub fn from_longitude(longitude: f64) -> Nakshatra {
        Nakshatra::ALL[nakshatra_of(longitude) as usize - 1]
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Nakshatra::Ashwini => "Ashwini",
            Nakshatra::Bharani => "Bharani",
            Nakshatra::Krittika => "Krittika",
            Nakshatra::Rohini => "Rohini",
            Nakshatra::Mrigashira => "Mrigashira",
            Nakshatra::Ardra => "Ardra",
            Nakshatra::Punarvasu => "Punarvasu",
            Nakshatra::Pushya => "Pushya",
            Nakshatra::Ashlesha => "Ashlesha",
            Nakshatra::Magha => "Magha",
            Nakshatra::PurvaPhalguni => "Purva Phalguni",
            Nakshatra::UttaraPhalguni => "Uttara Phalguni",
            Nakshatra::Hasta => "Hasta",
            Nakshatra::Chitra => "Chitra",
            Nakshatra::Swati => "Swati",
            Nakshatra::Vishakha => "Vishakha",
            Nakshatra::Anuradha => "Anuradha",
            Nakshatra::Jyeshtha => "Jyestha",
            Nakshatra::Moola => "Mula",
            Nakshatra::PurvaAshadha => "Purva Ashadha",
            Nakshatra::UttaraAshadha => "Uttara Ashadha",
            Nakshatra::Shravana => "Shravana",
            Nakshatra::Dhanishta => "Dhanishta",
            Nakshatra::Shatabhisha => "Shatabhisha",
            Nakshatra::PurvaBhadrapada => "Purva Bhadrapada",
            Nakshatra::UttaraBhadrapada => "Uttara Bhadrapada",
            Nakshatra::Revati => "Revati",
        }
    }

    pub fn gana(&self) -> Gana {
        let n = self.number();
        if DEVA.contains(&n) {
            Gana::Deva
        } else if MANUSHYA.contains(&n) {
            Gana::Manushya
        } else {
            Gana::Rakshasa
        }
    }

    pub fn nadi(&self) -> Nadi {
        let n = self.number();
        if VATA.contains(&n) {
            Nadi::Vata
        } else if PITTA.contains(&n) {
            Nadi::Pitta
        } else {
            Nadi::Kapha
        }
    }

    pub fn rajju(&self) -> Rajju {
        let n = self.number();
        if RAJJU_FEET.contains(&n) {
            Rajju::Feet
        } else if RAJJU_HIP.contains(&n) {
            Rajju::Hip
        } else if RAJJU_NECK.contains(&n) {
            Rajju::Neck
        } else if RAJJU_NAVEL.contains(&n) {
            Rajju::Navel
        } else {
            Rajju::Head
        }
    }

    pub fn yoni(&self) -> Yoni {
        match self {
            Nakshatra::Ashwini | Nakshatra::Shatabhisha => Yoni::Horse,
            Nakshatra::Bharani | Nakshatra::Revati => Yoni::Elephant,
            Nakshatra::Krittika | Nakshatra::Pushya => Yoni::Sheep,
            Nakshatra::Rohini | Nakshatra::Mrigashira => Yoni::Snake,
            Nakshatra::Ardra | Nakshatra::Moola => Yoni::Dog,
            Nakshatra::Punarvasu | Nakshatra::Ashlesha => Yoni::Cat,
            Nakshatra::Magha | Nakshatra::PurvaPhalguni => Yoni::Rat,
            Nakshatra::UttaraPhalguni | Nakshatra::UttaraBhadrapada => Yoni::Cow,
            Nakshatra::Hasta | Nakshatra::Swati => Yoni::Buffalo,
            Nakshatra::Chitra | Nakshatra::Vishakha => Yoni::Tiger,
            Nakshatra::Anuradha | Nakshatra::Jyeshtha => Yoni::Hare,
            Nakshatra::PurvaAshadha | Nakshatra::Shravana => Yoni::Monkey,
            Nakshatra::UttaraAshadha => Yoni::Mongoose,
            Nakshatra::Dhanishta | Nakshatra::PurvaBhadrapada => Yoni::Lion,
        }
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 6] = [
        RelationshipType::SoulConnection,
        RelationshipType::KarmicBond,
        RelationshipType::MutualGrowth,
        RelationshipType::FriendlyBonds,
        RelationshipType::BindingForces,
        RelationshipType::DynamicTension,
    ];

    pub fn base_score(&self) -> i32 {
        match self {
            RelationshipType::SoulConnection => 90,
            RelationshipType::MutualGrowth => 80,
            RelationshipType::FriendlyBonds => 70,
            RelationshipType::KarmicBond => 60,
            RelationshipType::BindingForces => 50,
            RelationshipType::DynamicTension => 40,
        }
    }

    pub fn canonical_intervals(&self) -> &'static [u8] {
        match self {
            RelationshipType::SoulConnection => &[0, 27],
            RelationshipType::KarmicBond => &[1, 10, 19],
            RelationshipType::MutualGrowth => &[2, 11, 20, 9, 18, 27],
            RelationshipType::FriendlyBonds => &[1, 10, 19, 4, 13, 22],
            RelationshipType::BindingForces => &[3, 12, 21, 6, 15, 24],
            RelationshipType::DynamicTension => &[8, 17, 26, 5, 14, 23],
        }
    }

    /// Category of a nakshatra interval.
    ///
    /// Intervals listed by more than one category go to the one with the higher base score.
    /// Intervals no category lists (7, 16 and 25) go to the category holding the numerically
    /// closest interval.
    pub fn classify(interval: u8) -> RelationshipType {
        let mut best: Option<RelationshipType> = None;
        for kind in RelationshipType::ALL {
            if kind.canonical_intervals().contains(&interval)
                && best.map_or(true, |b| kind.base_score() > b.base_score())
            {
                best = Some(kind);
            }
        }
        if let Some(kind) = best {
            return kind;
        }

        let mut closest = (RelationshipType::SoulConnection, u8::MAX);
        for kind in RelationshipType::ALL {
            for &candidate in kind.canonical_intervals() {
                let distance = interval.abs_diff(candidate);
                if distance < closest.1 {
                    closest = (kind, distance);
                }
            }
        }
        closest.0
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelationshipType::SoulConnection => "Soul Connection",
            RelationshipType::KarmicBond => "Karmic Bond",
            RelationshipType::MutualGrowth => "Mutual Growth",
            RelationshipType::FriendlyBonds => "Friendly Bonds",
            RelationshipType::BindingForces => "Binding Forces",
            RelationshipType::DynamicTension => "Dynamic Tension",
        }
    }

    /// Role labels for person 1 and person 2.
    pub fn roles(&self) -> (&'static str, &'static str) {
        match self {
            RelationshipType::SoulConnection => ("Soul Resonator", "Soul Resonator"),
            RelationshipType::KarmicBond => ("Karmic Initiator", "Karmic Recipient"),
            RelationshipType::DynamicTension => ("Dynamic Catalyst", "Transformation Subject"),
            RelationshipType::BindingForces => ("Structural Influence", "Boundary Experiencer"),
            RelationshipType::MutualGrowth => ("Developmental Catalyst", "Growth Experiencer"),
            RelationshipType::FriendlyBonds => ("Supportive Influence", "Energy Beneficiary"),
        }
    }

    pub fn description(&self, tier: IntensityTier) -> &'static str {
        use IntensityTier::*;
        use RelationshipType::*;
        match (self, tier) {
            (SoulConnection, _) => "You share a profound soul connection, with deep intuitive understanding and recognition of each other.",
            (KarmicBond, _) => "You share significant karmic ties from past lives, with important lessons to learn together.",
            (MutualGrowth, Near) => "Your relationship promotes strong mutual growth and development, with natural harmony.",
            (MutualGrowth, Moderate) => "Your relationship supports moderate mutual growth, with generally harmonious interactions.",
            (MutualGrowth, Far) => "Your relationship has potential for growth, though you may need to work at understanding each other.",
            (FriendlyBonds, Near) => "You share strong friendly bonds with natural support and easy communication.",
            (FriendlyBonds, Moderate) => "You share moderately friendly bonds, generally supporting each other's endeavors.",
            (FriendlyBonds, Far) => "Your friendly bonds require cultivation to fully support each other.",
            (BindingForces, Near) => "Your relationship has strong binding forces that create structure but can feel constraining.",
            (BindingForces, Moderate) => "Your relationship has moderate binding forces, creating some structure and occasional constraints.",
            (BindingForces, Far) => "Your relationship has mild binding forces, with subtle structural patterns.",
            (DynamicTension, Near) => "Your relationship has strong dynamic tension, creating intense growth opportunities through challenges.",
            (DynamicTension, Moderate) => "Your relationship has moderate dynamic tension, with periodic challenges that promote growth.",
            (DynamicTension, Far) => "Your relationship has mild dynamic tension, with occasional challenges.",
            (_, Fixed) => "Your relationship has unique qualities that may require deeper analysis to fully understand.",
        }
    }

    /// Only the tension categories are softened by a matching D9 ruler.
    fn promotes_on_concord(&self) -> bool {
        matches!(
            self,
            RelationshipType::BindingForces | RelationshipType::DynamicTension
        )
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl IntensityTier {
    pub fn from_interval(interval: u8, kind: RelationshipType) -> IntensityTier {
        match kind {
            RelationshipType::SoulConnection | RelationshipType::KarmicBond => IntensityTier::Fixed,
            _ if interval <= 5 => IntensityTier::Near,
            _ if interval <= 14 => IntensityTier::Moderate,
            _ => IntensityTier::Far,
        }
    }

    pub fn promoted(&self) -> IntensityTier {
        match self {
            IntensityTier::Far => IntensityTier::Moderate,
            IntensityTier::Moderate => IntensityTier::Near,
            other => *other,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            IntensityTier::Near => "NEAR ",
            IntensityTier::Moderate => "MODERATE ",
            IntensityTier::Far => "FAR ",
            IntensityTier::Fixed => "",
        }
    }
}

/// Navamsa sign of a Moon longitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D9Position {
    pub sign: ZodiacSign,
    pub ruler: String,
}

impl D9Position {
    pub fn from_longitude(longitude: f64) -> Self {
        let longitude = longitude.rem_euclid(360.0);
        let sign = (longitude / 30.0).floor() as u32 + 1;
        let subdivision = ((longitude % 30.0) / D9_SPAN).floor() as u32 + 1;
        let d9 = ((subdivision - 1) + (sign - 1)) % 12 + 1;
        let sign = ZodiacSign::from_number(d9 as u8);
        D9Position {
            sign,
            ruler: sign.d9_ruler().to_string(),
        }
    }

    fn default_position() -> Self {
        D9Position {
            sign: ZodiacSign::Aries,
            ruler: ZodiacSign::Aries.d9_ruler().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonNakshatra {
    pub nakshatra_number: u8,
    pub nakshatra_name: String,
    pub d9_position: D9Position,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NakshatraRelationship {
    pub person1: PersonNakshatra,
    pub person2: PersonNakshatra,
    pub interval: u8,
    pub base_tier: IntensityTier,
    pub tier: IntensityTier,
    pub relationship_type: RelationshipType,
    pub combined_name: String,
    pub description: String,
    pub d9_concord: bool,
    pub d9_adjustment: i32,
    pub energy: EnergyInteraction,
    pub score: i32,
}

impl NakshatraRelationship {
    fn fallback(reason: &SynastryError) -> Self {
        let kind = RelationshipType::SoulConnection;
        let (role1, role2) = kind.roles();
        let person = |role: &str| PersonNakshatra {
            nakshatra_number: 1,
            nakshatra_name: "Default".to_string(),
            d9_position: D9Position::default_position(),
            role: role.to_string(),
        };
        NakshatraRelationship {
            person1: person(role1),
            person2: person(role2),
            interval: 0,
            base_tier: IntensityTier::Fixed,
            tier: IntensityTier::Fixed,
            relationship_type: kind,
            combined_name: kind.name().to_string(),
            description: format!("Error calculating nakshatra relationship: {}", reason),
            d9_concord: true,
            d9_adjustment: 0,
            energy: EnergyInteraction {
                strength: 5,
                planets: vec![CelestialBody::Sun, CelestialBody::Moon],
                description: "Default planetary energy".to_string(),
            },
            score: 80,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.interval == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NakshatraCompatibility {
    pub vedha_dosha: bool,
    pub rajju_dosha: bool,
    pub mahendra: bool,
    pub ashtakoot_points: u32,
    pub compatibility_level: String,
    pub explanation: String,
}

impl NakshatraCompatibility {
    pub fn new(n1: u8, n2: u8, ashtakoot_points: u32) -> Self {
        let vedha_dosha = has_vedha_dosha(n1, n2);
        let rajju_dosha = has_rajju_dosha(n1, n2);
        let mahendra = is_mahendra(n1, n2);

        let compatibility_level = match ashtakoot_points {
            p if p >= 30 => "Excellent",
            p if p >= 24 => "Very Good",
            p if p >= 18 => "Good",
            _ => "Average",
        };

        let mut explanation = format!("Ashtakoot score: {}/36. ", ashtakoot_points);
        if vedha_dosha {
            explanation.push_str("Vedha Dosha is present. ");
        }
        if rajju_dosha {
            explanation.push_str("Rajju Dosha is present. ");
        }
        if mahendra {
            explanation.push_str("Beneficial Mahendra is present. ");
        }

        NakshatraCompatibility {
            vedha_dosha,
            rajju_dosha,
            mahendra,
            ashtakoot_points,
            compatibility_level: compatibility_level.to_string(),
            explanation,
        }
    }
}

fn moon_of(chart: &dyn ChartPositions, index: u8) -> Result<f64, SynastryError> {
    chart
        .longitude(CelestialBody::Moon)
        .ok_or(SynastryError::MissingBody {
            chart: index,
            body: CelestialBody::Moon,
        })
}

impl SynastryEngine {
    /// Relationship between the two Moons' nakshatras. Falls back to a fixed Soul Connection
    /// when either Moon is missing.
    pub fn nakshatra_relationship(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> NakshatraRelationship {
        match self.try_nakshatra_relationship(chart1, chart2) {
            Ok(relationship) => relationship,
            Err(e) => {
                warn!("Using default nakshatra relationship: {}", e);
                NakshatraRelationship::fallback(&e)
            }
        }
    }

    fn try_nakshatra_relationship(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> Result<NakshatraRelationship, SynastryError> {
        let moon1 = moon_of(chart1, 1)?;
        let moon2 = moon_of(chart2, 2)?;

        let nakshatra1 = Nakshatra::from_longitude(moon1);
        let nakshatra2 = Nakshatra::from_longitude(moon2);

        let forward = nakshatra_interval(nakshatra1.number(), nakshatra2.number());
        let backward = nakshatra_interval(nakshatra2.number(), nakshatra1.number());
        let forward_type = RelationshipType::classify(forward);
        let backward_type = RelationshipType::classify(backward);

        let (interval, kind) = if forward_type.base_score() >= backward_type.base_score() {
            (forward, forward_type)
        } else {
            (backward, backward_type)
        };
        debug!(
            "Nakshatras {} -> {}: interval {} classified as {}",
            nakshatra1, nakshatra2, interval, kind
        );

        let d9_1 = D9Position::from_longitude(moon1);
        let d9_2 = D9Position::from_longitude(moon2);
        let d9_concord = d9_1.ruler == d9_2.ruler;
        let d9_adjustment = if d9_concord { D9_CONCORD_BONUS } else { 0 };

        let energy = EnergyInteraction::calculate(chart1, chart2, kind);

        let base_tier = IntensityTier::from_interval(interval, kind);
        let tier = if d9_concord && kind.promotes_on_concord() {
            base_tier.promoted()
        } else {
            base_tier
        };

        let combined_name = format!("{}{}", tier.prefix(), kind.name());
        let mut description = kind.description(tier).to_string();
        if d9_concord {
            description.push_str(
                " The matching Moon rulers in your D9 charts enhance the harmony of your relationship.",
            );
        }
        description.push(' ');
        description.push_str(&energy.description);

        let mut score = kind.base_score();
        match tier {
            IntensityTier::Near => score = (score + NEAR_TIER_BONUS).min(100),
            IntensityTier::Far => score = (score - FAR_TIER_PENALTY).max(0),
            _ => {}
        }
        score += d9_adjustment;
        score += energy.strength;
        let score = score.clamp(0, 100);

        let (role1, role2) = kind.roles();
        Ok(NakshatraRelationship {
            person1: PersonNakshatra {
                nakshatra_number: nakshatra1.number(),
                nakshatra_name: nakshatra1.name().to_string(),
                d9_position: d9_1,
                role: role1.to_string(),
            },
            person2: PersonNakshatra {
                nakshatra_number: nakshatra2.number(),
                nakshatra_name: nakshatra2.name().to_string(),
                d9_position: d9_2,
                role: role2.to_string(),
            },
            interval,
            base_tier,
            tier,
            relationship_type: kind,
            combined_name,
            description,
            d9_concord,
            d9_adjustment,
            energy,
            score,
        })
    }

    /// Dosha flags and ashtakoot points of the two Moons, or `None` when either Moon is missing.
    pub fn nakshatra_compatibility(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> Option<NakshatraCompatibility> {
        let (moon1, moon2) = match (moon_of(chart1, 1), moon_of(chart2, 2)) {
            (Ok(moon1), Ok(moon2)) => (moon1, moon2),
            (Err(e), _) | (_, Err(e)) => {
                debug!("Skipping nakshatra compatibility: {}", e);
                return None;
            }
        };
        let points = match self.config().ashtakoot {
            AshtakootMode::Fixed { points } => points,
            AshtakootMode::Computed => calculate_ashtakoot(moon1, moon2).total(),
        };
        Some(NakshatraCompatibility::new(
            nakshatra_of(moon1),
            nakshatra_of(moon2),
            points,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn moons(moon1: f64, moon2: f64) -> (ChartSnapshot, ChartSnapshot) {
        (
            ChartSnapshot::new().with_planet(CelestialBody::Moon, moon1),
            ChartSnapshot::new().with_planet(CelestialBody::Moon, moon2),
        )
    }

    #[test]
    fn nakshatra_boundaries() {
        assert_eq!(nakshatra_of(0.0), 1);
        assert_eq!(nakshatra_of(13.3), 1);
        assert_eq!(nakshatra_of(13.34), 2);
        assert_eq!(nakshatra_of(359.99), 27);
        assert_eq!(nakshatra_of(-1.0), 27);
        assert_eq!(Nakshatra::from_longitude(245.0), Nakshatra::Moola);
        assert_eq!(Nakshatra::Moola.name(), "Mula");
    }

    #[test]
    fn intervals_are_forward_distances() {
        assert_eq!(nakshatra_interval(1, 1), 27);
        assert_eq!(nakshatra_interval(1, 2), 1);
        assert_eq!(nakshatra_interval(2, 1), 26);
        assert_eq!(nakshatra_interval(1, 19), 18);
        assert_eq!(nakshatra_interval(19, 1), 9);
    }

    #[test]
    fn classification_prefers_higher_base_score() {
        assert_eq!(RelationshipType::classify(27), RelationshipType::SoulConnection);
        assert_eq!(RelationshipType::classify(1), RelationshipType::FriendlyBonds);
        assert_eq!(RelationshipType::classify(10), RelationshipType::FriendlyBonds);
        assert_eq!(RelationshipType::classify(18), RelationshipType::MutualGrowth);
        assert_eq!(RelationshipType::classify(5), RelationshipType::DynamicTension);
        assert_eq!(RelationshipType::classify(6), RelationshipType::BindingForces);
    }

    #[test]
    fn unlisted_intervals_use_nearest_category() {
        for interval in [7, 16, 25] {
            assert_eq!(
                RelationshipType::classify(interval),
                RelationshipType::BindingForces
            );
        }
    }

    #[test]
    fn tiers_and_promotion() {
        use IntensityTier::*;
        assert_eq!(IntensityTier::from_interval(27, RelationshipType::SoulConnection), Fixed);
        assert_eq!(IntensityTier::from_interval(3, RelationshipType::BindingForces), Near);
        assert_eq!(IntensityTier::from_interval(14, RelationshipType::DynamicTension), Moderate);
        assert_eq!(IntensityTier::from_interval(15, RelationshipType::BindingForces), Far);
        assert_eq!(Far.promoted(), Moderate);
        assert_eq!(Moderate.promoted(), Near);
        assert_eq!(Near.promoted(), Near);
        assert_eq!(Fixed.promoted(), Fixed);
    }

    #[test]
    fn d9_positions() {
        let d9 = D9Position::from_longitude(5.0);
        assert_eq!(d9.sign, ZodiacSign::Taurus);
        assert_eq!(d9.ruler, "Venus");

        assert_eq!(D9Position::from_longitude(17.0).sign, ZodiacSign::Virgo);
        let d9 = D9Position::from_longitude(245.0);
        assert_eq!(d9.sign, ZodiacSign::Capricorn);
        assert_eq!(d9.ruler, "Saturn");
    }

    #[test]
    fn doshas() {
        assert!(has_vedha_dosha(1, 18));
        assert!(has_vedha_dosha(18, 1));
        assert!(has_vedha_dosha(14, 23));
        assert!(!has_vedha_dosha(1, 2));

        assert!(has_rajju_dosha(1, 1));
        assert!(has_rajju_dosha(1, 19));
        assert!(!has_rajju_dosha(1, 2));
        assert!(has_rajju_dosha(5, 23));

        assert!(!is_mahendra(1, 1));
        assert!(is_mahendra(5, 1));
        assert!(!is_mahendra(1, 19));
    }

    #[test]
    fn same_moon_is_soul_connection() {
        let engine = SynastryEngine::default();
        let (chart1, chart2) = moons(5.0, 5.0);
        let relationship = engine.nakshatra_relationship(&chart1, &chart2);

        assert_eq!(relationship.interval, 27);
        assert_eq!(relationship.relationship_type, RelationshipType::SoulConnection);
        assert_eq!(relationship.tier, IntensityTier::Fixed);
        assert_eq!(relationship.combined_name, "Soul Connection");
        assert!(relationship.d9_concord);
        assert_eq!(relationship.energy.strength, 9);
        assert_eq!(relationship.score, 100);
        assert_eq!(relationship.person1.role, "Soul Resonator");
        assert!(relationship
            .description
            .ends_with("Moderate planetary energy exists between you."));
    }

    #[test]
    fn adjacent_nakshatras_are_near_friendly_bonds() {
        let engine = SynastryEngine::default();
        let (chart1, chart2) = moons(5.0, 17.0);
        let relationship = engine.nakshatra_relationship(&chart1, &chart2);

        assert_eq!(relationship.interval, 1);
        assert_eq!(relationship.relationship_type, RelationshipType::FriendlyBonds);
        assert_eq!(relationship.tier, IntensityTier::Near);
        assert_eq!(relationship.combined_name, "NEAR Friendly Bonds");
        assert!(!relationship.d9_concord);
        assert_eq!(relationship.score, 80);
    }

    #[test]
    fn tied_directions_keep_forward() {
        let engine = SynastryEngine::default();
        let (chart1, chart2) = moons(5.0, 245.0);
        let relationship = engine.nakshatra_relationship(&chart1, &chart2);

        assert_eq!(relationship.interval, 18);
        assert_eq!(relationship.relationship_type, RelationshipType::MutualGrowth);
        assert_eq!(relationship.tier, IntensityTier::Far);
        assert_eq!(relationship.combined_name, "FAR Mutual Growth");
        assert_eq!(relationship.score, 70);
        assert_eq!(relationship.person2.nakshatra_name, "Mula");
        assert_eq!(
            relationship.description,
            "Your relationship has potential for growth, though you may need to work at \
             understanding each other. The planetary energy between you is subtle and may \
             require attention to develop."
        );
    }

    #[test]
    fn concord_promotes_tension_tiers() {
        let engine = SynastryEngine::default();
        // Nakshatras 1 and 16 are 15 apart (Binding Forces, Far). 1.0 and 201.0 both fall in
        // an Aries navamsa.
        let (chart1, chart2) = moons(1.0, 201.0);
        let relationship = engine.nakshatra_relationship(&chart1, &chart2);

        assert_eq!(relationship.relationship_type, RelationshipType::BindingForces);
        assert!(relationship.d9_concord);
        assert_eq!(relationship.base_tier, IntensityTier::Far);
        assert_eq!(relationship.tier, IntensityTier::Moderate);
        assert_eq!(relationship.combined_name, "MODERATE Binding Forces");
        assert_eq!(relationship.score, 60);
    }

    #[test]
    fn missing_moon_falls_back() {
        let engine = SynastryEngine::default();
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Sun, 10.0);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 10.0);
        let relationship = engine.nakshatra_relationship(&chart1, &chart2);

        assert!(relationship.is_fallback());
        assert_eq!(relationship.relationship_type, RelationshipType::SoulConnection);
        assert_eq!(relationship.score, 80);
        assert_eq!(relationship.person1.nakshatra_name, "Default");
        assert_eq!(relationship.person2.d9_position.ruler, "Mars");
        assert_eq!(relationship.energy.strength, 5);
        assert!(relationship
            .description
            .starts_with("Error calculating nakshatra relationship: "));
    }

    #[test]
    fn missing_moon_has_no_compatibility() {
        let engine = SynastryEngine::new(EngineConfig::strict());
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Sun, 10.0);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 230.0);

        assert_eq!(engine.nakshatra_compatibility(&chart1, &chart2), None);
        assert_eq!(engine.nakshatra_compatibility(&chart2, &chart1), None);
        assert!(engine.nakshatra_compatibility(&chart2, &chart2).is_some());
    }

    #[test]
    fn compatibility_flags_and_explanation() {
        let engine = SynastryEngine::default();
        let (chart1, chart2) = moons(5.0, 5.0);
        let compatibility = engine.nakshatra_compatibility(&chart1, &chart2).unwrap();

        assert!(compatibility.rajju_dosha);
        assert!(!compatibility.vedha_dosha);
        assert!(!compatibility.mahendra);
        assert_eq!(compatibility.ashtakoot_points, 25);
        assert_eq!(compatibility.compatibility_level, "Very Good");
        assert_eq!(
            compatibility.explanation,
            "Ashtakoot score: 25/36. Rajju Dosha is present. "
        );
    }

    proptest! {
        #[test]
        fn nakshatra_in_range_and_periodic(m in 0i64..3_600_000) {
            let longitude = m as f64 / 10_000.0;
            let n = nakshatra_of(longitude);
            prop_assert!((1..=27).contains(&n));
            prop_assert_eq!(n, nakshatra_of(longitude + 360.0));
        }

        #[test]
        fn interval_in_range(a in 1u8..=27, b in 1u8..=27) {
            let interval = nakshatra_interval(a, b);
            prop_assert!((1..=27).contains(&interval));
            prop_assert_eq!(nakshatra_interval(a, a), 27);
        }
    }
}

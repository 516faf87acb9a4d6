use super::*;

pub const ASHTAKOOT_MAX_POINTS: u32 = 36;

/// Points of each of the eight kutas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AshtakootBreakdown {
    pub varna: u32,
    pub vasya: u32,
    pub tara: u32,
    pub yoni: u32,
    pub graha_maitri: u32,
    pub gana: u32,
    pub bhakut: u32,
    pub nadi: u32,
}

impl AshtakootBreakdown {
    pub fn total(&self) -> u32 {
        self.varna
            + self.vasya
            + self.tara
            + self.yoni
            + self.graha_maitri
            + self.gana
            + self.bhakut
            + self.nadi
    }
}

/// Eight kuta points from the two Moon longitudes. Person 1 is read as the groom side for
/// the directional kutas (varna, tara).
pub fn calculate_ashtakoot(moon1: f64, moon2: f64) -> AshtakootBreakdown {
    let sign1 = ZodiacSign::from_longitude(moon1);
    let sign2 = ZodiacSign::from_longitude(moon2);
    let n1 = nakshatra_of(moon1);
    let n2 = nakshatra_of(moon2);
    let nakshatra1 = Nakshatra::from_longitude(moon1);
    let nakshatra2 = Nakshatra::from_longitude(moon2);

    AshtakootBreakdown {
        varna: if get_varna(sign1) >= get_varna(sign2) { 1 } else { 0 },
        vasya: if check_vasya_compatibility(sign1, sign2) { 2 } else { 0 },
        tara: calculate_tara_kuta(n1, n2),
        yoni: calculate_yoni_kuta(nakshatra1, nakshatra2),
        graha_maitri: calculate_graha_maitri(sign1.lord(), sign2.lord()),
        gana: if check_gana_compatibility(nakshatra1.gana(), nakshatra2.gana()) { 6 } else { 0 },
        bhakut: if check_bhakut_compatibility(sign1, sign2) { 7 } else { 0 },
        nadi: if nakshatra1.nadi() != nakshatra2.nadi() { 8 } else { 0 },
    }
}

fn get_varna(sign: ZodiacSign) -> u32 {
    match sign {
        ZodiacSign::Leo | ZodiacSign::Aries | ZodiacSign::Sagittarius => 4, // Brahmin
        ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => 3, // Kshatriya
        ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => 2, // Vaishya
        ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => 1, // Shudra
    }
}

fn check_vasya_compatibility(sign1: ZodiacSign, sign2: ZodiacSign) -> bool {
    const VASYA_GROUPS: [&[ZodiacSign]; 6] = [
        &[ZodiacSign::Leo, ZodiacSign::Aries],
        &[ZodiacSign::Cancer, ZodiacSign::Scorpio],
        &[ZodiacSign::Gemini, ZodiacSign::Libra, ZodiacSign::Aquarius],
        &[ZodiacSign::Taurus, ZodiacSign::Capricorn],
        &[ZodiacSign::Virgo, ZodiacSign::Pisces],
        &[ZodiacSign::Sagittarius],
    ];

    VASYA_GROUPS
        .iter()
        .any(|group| group.contains(&sign1) && group.contains(&sign2))
}

fn calculate_tara_kuta(n1: u8, n2: u8) -> u32 {
    let tara = ((n2 as u32 + 27) - n1 as u32) % 27 / 3;
    match tara {
        1 | 3 | 5 | 7 => 3,
        _ => 0,
    }
}

/// 4 for the same animal, 0 for a sworn-enemy pair, 2 otherwise.
fn calculate_yoni_kuta(nakshatra1: Nakshatra, nakshatra2: Nakshatra) -> u32 {
    let yoni1 = nakshatra1.yoni();
    let yoni2 = nakshatra2.yoni();
    if yoni1 == yoni2 {
        4
    } else if yoni1.is_enemy_of(yoni2) {
        0
    } else {
        2
    }
}

fn calculate_graha_maitri(lord1: CelestialBody, lord2: CelestialBody) -> u32 {
    if lord1 == lord2 || are_planets_friends(lord1, lord2) {
        5
    } else if are_planets_neutral(lord1, lord2) {
        3
    } else {
        0
    }
}

fn are_planets_friends(planet1: CelestialBody, planet2: CelestialBody) -> bool {
    use CelestialBody::*;
    const FRIENDSHIPS: [(CelestialBody, &[CelestialBody]); 7] = [
        (Sun, &[Moon, Mars, Jupiter]),
        (Moon, &[Sun, Mercury]),
        (Mars, &[Sun, Moon, Jupiter]),
        (Mercury, &[Sun, Venus]),
        (Jupiter, &[Sun, Moon, Mars]),
        (Venus, &[Mercury, Saturn]),
        (Saturn, &[Mercury, Venus]),
    ];

    FRIENDSHIPS.iter().any(|&(p, friends)| {
        (p == planet1 && friends.contains(&planet2)) || (p == planet2 && friends.contains(&planet1))
    })
}

fn are_planets_neutral(planet1: CelestialBody, planet2: CelestialBody) -> bool {
    use CelestialBody::*;
    const NEUTRAL_RELATIONS: [(CelestialBody, &[CelestialBody]); 7] = [
        (Sun, &[Mercury]),
        (Moon, &[Mars, Jupiter, Venus, Saturn]),
        (Mars, &[Mercury, Venus, Saturn]),
        (Mercury, &[Mars, Jupiter, Saturn]),
        (Jupiter, &[Mercury, Venus, Saturn]),
        (Venus, &[Mars, Jupiter]),
        (Saturn, &[Mars, Jupiter]),
    ];

    NEUTRAL_RELATIONS.iter().any(|&(p, neutrals)| {
        (p == planet1 && neutrals.contains(&planet2)) || (p == planet2 && neutrals.contains(&planet1))
    })
}

fn check_gana_compatibility(gana1: Gana, gana2: Gana) -> bool {
    matches!(
        (gana1, gana2),
        (Gana::Deva, Gana::Deva)
            | (Gana::Manushya, Gana::Manushya)
            | (Gana::Rakshasa, Gana::Rakshasa)
            | (Gana::Deva, Gana::Manushya)
            | (Gana::Manushya, Gana::Deva)
    )
}

/// 2/12, 5/9 and 6/8 sign relationships lose the bhakut points.
fn check_bhakut_compatibility(sign1: ZodiacSign, sign2: ZodiacSign) -> bool {
    let diff = (sign2.number() + 12 - sign1.number()) % 12;
    !matches!(diff, 1 | 11 | 4 | 8 | 5 | 7)
}

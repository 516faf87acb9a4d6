use super::*;
use tracing::debug;

/// A body pairing worth checking and the aspects it may form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRule {
    pub planet_a: CelestialBody,
    pub planet_b: CelestialBody,
    pub kinds: &'static [AspectKind],
}

const fn rule(
    planet_a: CelestialBody,
    planet_b: CelestialBody,
    kinds: &'static [AspectKind],
) -> AspectRule {
    AspectRule {
        planet_a,
        planet_b,
        kinds,
    }
}

use AspectKind::{Conjunction, Opposition, Sextile, Square, Trine};
use CelestialBody::{Jupiter, Mars, Mercury, Moon, Neptune, Pluto, Saturn, Sun, Uranus, Venus};

const ALL_KINDS: &[AspectKind] = &[Conjunction, Sextile, Square, Trine, Opposition];

/// Curated synastry pairings, checked in this order.
pub const KEY_COMBINATIONS: [AspectRule; 20] = [
    rule(Sun, Moon, ALL_KINDS),
    rule(Sun, Mercury, &[Conjunction, Sextile]),
    rule(Sun, Venus, &[Conjunction, Sextile]),
    rule(Sun, Mars, ALL_KINDS),
    rule(Sun, Jupiter, &[Conjunction, Trine, Opposition]),
    rule(Sun, Saturn, &[Conjunction, Square, Opposition]),
    rule(Moon, Mercury, &[Conjunction, Trine, Square]),
    rule(Moon, Venus, &[Conjunction, Trine, Square, Opposition]),
    rule(Moon, Mars, &[Conjunction, Trine, Square, Opposition]),
    rule(Moon, Jupiter, &[Conjunction, Trine]),
    rule(Moon, Saturn, &[Conjunction, Trine, Square, Opposition]),
    rule(Venus, Mars, &[Conjunction, Trine, Square, Opposition]),
    rule(Venus, Jupiter, &[Conjunction, Trine]),
    rule(Venus, Saturn, &[Conjunction, Opposition]),
    rule(Mars, Jupiter, &[Conjunction, Trine, Opposition]),
    rule(Mars, Saturn, &[Conjunction, Square, Opposition]),
    rule(Jupiter, Saturn, &[Conjunction, Square, Opposition]),
    rule(Sun, Uranus, &[Trine, Square]),
    rule(Moon, Neptune, &[Opposition]),
    rule(Venus, Pluto, &[Opposition, Conjunction]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    /// Body from chart 1.
    pub planet1: CelestialBody,
    /// Body from chart 2.
    pub planet2: CelestialBody,
    pub kind: AspectKind,
    /// Separation minus the exact aspect angle.
    pub orb: f64,
    pub quality: String,
    pub influence: String,
}

impl Aspect {
    pub fn involves(&self, body: CelestialBody) -> bool {
        self.planet1 == body || self.planet2 == body
    }

    /// True when the aspect joins `a` and `b`, in either chart order.
    pub fn connects(&self, a: CelestialBody, b: CelestialBody) -> bool {
        (self.planet1 == a && self.planet2 == b) || (self.planet1 == b && self.planet2 == a)
    }

    /// "Sun trine Moon".
    pub fn description(&self) -> String {
        format!("{} {} {}", self.planet1, self.kind, self.planet2)
    }
}

/// Shortest arc between two longitudes, 0..=180.
pub fn angular_separation(lon1: f64, lon2: f64) -> f64 {
    let diff = (lon1 - lon2).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Sun can never be far enough from Mercury or Venus to square, trine or oppose them.
pub fn is_valid_aspect(planet1: CelestialBody, planet2: CelestialBody, kind: AspectKind) -> bool {
    if planet1 == planet2 {
        return false;
    }
    let sun_with_inner = (planet1 == Sun && matches!(planet2, Mercury | Venus))
        || (planet2 == Sun && matches!(planet1, Mercury | Venus));
    !(sun_with_inner && matches!(kind, Square | Trine | Opposition))
}

/// The allowed aspect formed by `separation`, with its signed orb.
pub fn match_aspect(
    separation: f64,
    allowed: &[AspectKind],
    planet1: CelestialBody,
    planet2: CelestialBody,
    orbs: &OrbConfig,
) -> Option<(AspectKind, f64)> {
    allowed.iter().find_map(|&kind| {
        let orb = separation - kind.angle();
        if orb.abs() <= orbs.tolerance(kind, planet1, planet2) {
            Some((kind, orb))
        } else {
            None
        }
    })
}

impl SynastryEngine {
    /// Cross-chart aspects of the curated pairings. Each pairing is tried as chart1.A with
    /// chart2.B and then as chart1.B with chart2.A.
    pub fn synastry_aspects(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> Vec<Aspect> {
        let orbs = &self.config().orbs;
        let mut aspects = Vec::new();

        for rule in KEY_COMBINATIONS.iter() {
            let directions = [(rule.planet_a, rule.planet_b), (rule.planet_b, rule.planet_a)];
            for (body1, body2) in directions {
                let (lon1, lon2) = match (chart1.longitude(body1), chart2.longitude(body2)) {
                    (Some(lon1), Some(lon2)) if lon1.is_finite() && lon2.is_finite() => {
                        (lon1, lon2)
                    }
                    _ => {
                        debug!("Skipping {} / {}: position unavailable", body1, body2);
                        continue;
                    }
                };

                let separation = angular_separation(lon1, lon2);
                if let Some((kind, orb)) = match_aspect(separation, rule.kinds, body1, body2, orbs)
                {
                    if is_valid_aspect(body1, body2, kind) {
                        aspects.push(Aspect {
                            planet1: body1,
                            planet2: body2,
                            kind,
                            orb,
                            quality: kind.quality().to_string(),
                            influence: kind.influence().to_string(),
                        });
                    }
                }
            }
        }

        aspects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chart(bodies: &[(CelestialBody, f64)]) -> ChartSnapshot {
        bodies
            .iter()
            .fold(ChartSnapshot::new(), |chart, &(body, lon)| chart.with_planet(body, lon))
    }

    #[test]
    fn separation_takes_short_arc() {
        assert_relative_eq!(angular_separation(10.0, 350.0), 20.0);
        assert_relative_eq!(angular_separation(350.0, 10.0), 20.0);
        assert_relative_eq!(angular_separation(0.0, 180.0), 180.0);
        assert_relative_eq!(angular_separation(123.0, 245.0), 122.0);
        assert_relative_eq!(angular_separation(-30.0, 30.0), 60.0);
    }

    #[test]
    fn sun_trine_moon_across_charts() {
        let engine = SynastryEngine::default();
        let chart1 = chart(&[(Sun, 123.0), (Moon, 5.0)]);
        let chart2 = chart(&[(Moon, 245.0)]);
        let aspects = engine.synastry_aspects(&chart1, &chart2);

        assert_eq!(aspects.len(), 1);
        let aspect = &aspects[0];
        assert_eq!(aspect.planet1, Sun);
        assert_eq!(aspect.planet2, Moon);
        assert_eq!(aspect.kind, AspectKind::Trine);
        assert_relative_eq!(aspect.orb, 2.0);
        assert_eq!(aspect.quality, "Harmonious");
        assert_eq!(aspect.influence, "Flow, harmony, ease");
        assert_eq!(aspect.description(), "Sun trine Moon");
    }

    #[test]
    fn both_directions_are_kept() {
        let engine = SynastryEngine::default();
        let chart1 = chart(&[(Sun, 10.0), (Moon, 10.0)]);
        let chart2 = chart(&[(Sun, 10.0), (Moon, 10.0)]);
        let aspects = engine.synastry_aspects(&chart1, &chart2);

        assert_eq!(aspects.len(), 2);
        assert_eq!((aspects[0].planet1, aspects[0].planet2), (Sun, Moon));
        assert_eq!((aspects[1].planet1, aspects[1].planet2), (Moon, Sun));
        assert!(aspects.iter().all(|a| a.kind == AspectKind::Conjunction));
    }

    #[test]
    fn second_direction_reports_chart1_body_first() {
        let engine = SynastryEngine::default();
        let chart1 = chart(&[(Moon, 100.0)]);
        let chart2 = chart(&[(Sun, 40.0)]);
        let aspects = engine.synastry_aspects(&chart1, &chart2);

        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].planet1, Moon);
        assert_eq!(aspects[0].planet2, Sun);
        assert_eq!(aspects[0].kind, AspectKind::Sextile);
    }

    #[test]
    fn non_luminaries_get_tighter_orbs() {
        let engine = SynastryEngine::default();
        let chart1 = chart(&[(Venus, 0.0)]);

        let aspects = engine.synastry_aspects(&chart1, &chart(&[(Mars, 7.5)]));
        assert!(aspects.is_empty());

        let aspects = engine.synastry_aspects(&chart1, &chart(&[(Mars, 6.5)]));
        assert_eq!(aspects.len(), 1);
        assert_relative_eq!(aspects[0].orb, 6.5);
    }

    #[test]
    fn disallowed_kinds_are_ignored() {
        let engine = SynastryEngine::default();
        // Sun-Jupiter may not form a square.
        let aspects = engine.synastry_aspects(&chart(&[(Sun, 0.0)]), &chart(&[(Jupiter, 90.0)]));
        assert!(aspects.is_empty());
    }

    #[test]
    fn validity_rules() {
        assert!(!is_valid_aspect(Sun, Sun, AspectKind::Conjunction));
        assert!(!is_valid_aspect(Sun, Venus, AspectKind::Trine));
        assert!(!is_valid_aspect(Mercury, Sun, AspectKind::Opposition));
        assert!(is_valid_aspect(Sun, Venus, AspectKind::Sextile));
        assert!(is_valid_aspect(Moon, Venus, AspectKind::Square));
    }

    #[test]
    fn missing_bodies_are_skipped() {
        let engine = SynastryEngine::default();
        let aspects = engine.synastry_aspects(&ChartSnapshot::new(), &chart(&[(Moon, 0.0)]));
        assert!(aspects.is_empty());
    }
}

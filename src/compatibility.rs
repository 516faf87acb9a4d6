use super::*;
use tracing::{debug, info};

/// Bodies placed in the other person's houses.
const PLACED_BODIES: [CelestialBody; 7] = [
    CelestialBody::Sun,
    CelestialBody::Moon,
    CelestialBody::Mercury,
    CelestialBody::Venus,
    CelestialBody::Mars,
    CelestialBody::Jupiter,
    CelestialBody::Saturn,
];

const WEIGHTED_BASE: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousePlacement {
    pub body: CelestialBody,
    pub house: House,
    pub description: String,
}

impl HousePlacement {
    pub fn new(body: CelestialBody, house: House) -> Self {
        HousePlacement {
            body,
            house,
            description: format!("{} in {} house", body, house.ordinal()),
        }
    }
}

/// Person 2's bodies in person 1's houses, then person 1's bodies in person 2's houses.
pub fn house_placements(
    chart1: &dyn ChartPositions,
    chart2: &dyn ChartPositions,
) -> (Vec<HousePlacement>, Vec<HousePlacement>) {
    fn place(bodies_of: &dyn ChartPositions, houses_of: &dyn ChartPositions) -> Vec<HousePlacement> {
        PLACED_BODIES
            .iter()
            .filter_map(|&body| {
                let longitude = bodies_of.longitude(body)?;
                let house = houses_of.house_of(longitude)?;
                Some(HousePlacement::new(body, house))
            })
            .collect()
    }
    (place(chart2, chart1), place(chart1, chart2))
}

pub fn compatibility_level(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "Excellent",
        s if s >= 80.0 => "Very Good",
        s if s >= 70.0 => "Good",
        s if s >= 60.0 => "Above Average",
        s if s >= 50.0 => "Average",
        s if s >= 40.0 => "Below Average",
        s if s >= 30.0 => "Challenging",
        s if s >= 20.0 => "Difficult",
        _ => "Very Difficult",
    }
}

pub fn summary_sentence(score: f64) -> &'static str {
    match score {
        s if s >= 80.0 => "This is an extraordinary connection with strong harmony. You share many beneficial aspects that support mutual growth and understanding.",
        s if s >= 70.0 => "You have a very good connection with more harmonious aspects than challenging ones. Your relationship has great potential for growth and happiness.",
        s if s >= 60.0 => "Your connection shows a good balance of harmonious and challenging aspects. While there are some tensions, they can lead to growth.",
        s if s >= 50.0 => "Your connection has an average mix of aspects. There are both areas of ease and challenge in your relationship.",
        s if s >= 40.0 => "Your connection has more challenging aspects than harmonious ones. This relationship may require work but can lead to significant growth.",
        _ => "This connection shows significant challenges. While difficult, these tensions can lead to profound personal development if addressed consciously.",
    }
}

/// Aspect-weighted score: base 40, each aspect weighted by the bodies involved and how
/// tight it is, plus bonuses for the overall balance of the aspect list.
pub fn aspect_weighted_score(aspects: &[Aspect]) -> f64 {
    use CelestialBody::*;

    let mut score = WEIGHTED_BASE;
    let mut harmonious = 0;
    let mut challenging = 0;
    let mut neutral = 0;
    let mut sun_moon_harmonious = 0;
    let mut sun_moon_challenging = 0;
    let mut venus_mars_harmonious = 0;
    let mut venus_mars_challenging = 0;

    for aspect in aspects {
        let kind = aspect.kind;
        let orb = aspect.orb.abs();
        let orb_factor = if orb < 1.0 {
            1.5
        } else if orb < 2.0 {
            1.2
        } else {
            1.0
        };

        let mut weight = 1.0;
        if aspect.connects(Sun, Moon) {
            weight = 2.5;
            if kind.is_favorable() {
                sun_moon_harmonious += 1;
            } else {
                sun_moon_challenging += 1;
            }
        } else if aspect.involves(Sun) || aspect.involves(Moon) {
            weight = 1.8;
        }
        if aspect.connects(Venus, Mars) {
            weight = 2.0;
            if kind.is_favorable() {
                venus_mars_harmonious += 1;
            } else {
                venus_mars_challenging += 1;
            }
        }

        let points = match kind {
            AspectKind::Conjunction => {
                neutral += 1;
                if aspect.involves(Saturn) || aspect.involves(Pluto) {
                    2.0
                } else {
                    3.0
                }
            }
            AspectKind::Trine => {
                harmonious += 1;
                5.0
            }
            AspectKind::Sextile => {
                harmonious += 1;
                3.0
            }
            AspectKind::Square => {
                challenging += 1;
                if aspect.involves(Jupiter) {
                    -1.0
                } else {
                    -2.0
                }
            }
            AspectKind::Opposition => {
                challenging += 1;
                if aspect.involves(Mercury) {
                    -1.0
                } else {
                    -1.5
                }
            }
        };
        score += points * weight * orb_factor;
    }

    let total = harmonious + challenging + neutral;
    if total > 0 {
        let harmony_ratio = harmonious as f64 / total as f64;
        if harmony_ratio > 0.7 {
            score += 8.0;
        } else if harmony_ratio > 0.5 {
            score += 5.0;
        }
        if sun_moon_harmonious > 0 {
            score += 7.0;
        }
        if venus_mars_harmonious > 0 {
            score += 5.0;
        }
        if sun_moon_challenging > 1 {
            score -= 6.0;
        }
        if venus_mars_challenging > 1 {
            score -= 4.0;
        }
    }

    score.clamp(0.0, 100.0)
}

impl SynastryEngine {
    pub fn analyze(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> Result<SynastryReport, SynastryError> {
        self.analyze_named(chart1, chart2, "Person 1", "Person 2")
    }

    pub fn analyze_named(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
        name1: &str,
        name2: &str,
    ) -> Result<SynastryReport, SynastryError> {
        chart1.validate(1)?;
        chart2.validate(2)?;

        let aspects = self.synastry_aspects(chart1, chart2);
        let (person2_in_person1_houses, person1_in_person2_houses) =
            house_placements(chart1, chart2);
        let relationship = self.nakshatra_relationship(chart1, chart2);
        let nakshatra_compatibility = self.nakshatra_compatibility(chart1, chart2);
        let dimensions = score_dimensions(&aspects, &relationship, nakshatra_compatibility.as_ref());
        debug!(
            "{} aspects, relationship {} ({})",
            aspects.len(),
            relationship.combined_name,
            relationship.score
        );

        let compatibility_score = match self.config().overall_score {
            OverallScorePolicy::MaxDimension => dimensions.max_score(),
            OverallScorePolicy::RelationshipScore => relationship.score as f64,
            OverallScorePolicy::AspectWeighted => aspect_weighted_score(&aspects),
        }
        .clamp(0.0, 100.0);

        let relationship_summary = format!(
            "{} Nakshatra analysis shows your relationship is a {}. {}",
            summary_sentence(compatibility_score),
            relationship.combined_name,
            relationship.description
        );
        let influence = |name: &str, role: &str| {
            format!(
                "In this {}, {} serves as the {}.",
                relationship.combined_name, name, role
            )
        };
        let person1_influence = influence(name1, &relationship.person1.role);
        let person2_influence = influence(name2, &relationship.person2.role);

        info!(
            "Synastry analysis complete: score {:.1}, {}",
            compatibility_score, relationship.combined_name
        );

        Ok(SynastryReport {
            compatibility_score,
            compatibility_level: compatibility_level(compatibility_score).to_string(),
            relationship_summary,
            dimensions,
            relationship,
            nakshatra_compatibility,
            person1_influence,
            person2_influence,
            aspects,
            person2_in_person1_houses,
            person1_in_person2_houses,
        })
    }

    /// Analysis as a serializable response. Errors become `{"status": "error"}` records.
    pub fn respond(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
    ) -> SynastryResponse {
        self.analyze(chart1, chart2).into()
    }

    pub fn respond_named(
        &self,
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
        name1: &str,
        name2: &str,
    ) -> SynastryResponse {
        self.analyze_named(chart1, chart2, name1, name2).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trine(orb: f64) -> Aspect {
        Aspect {
            planet1: CelestialBody::Sun,
            planet2: CelestialBody::Moon,
            kind: AspectKind::Trine,
            orb,
            quality: AspectKind::Trine.quality().to_string(),
            influence: AspectKind::Trine.influence().to_string(),
        }
    }

    #[test]
    fn levels() {
        assert_eq!(compatibility_level(90.0), "Excellent");
        assert_eq!(compatibility_level(76.0), "Good");
        assert_eq!(compatibility_level(63.0), "Above Average");
        assert_eq!(compatibility_level(45.0), "Below Average");
        assert_eq!(compatibility_level(19.9), "Very Difficult");
    }

    #[test]
    fn weighted_score_single_trine() {
        // 40 + 5 * 2.5 + 8 (all harmonious) + 7 (Sun-Moon harmony)
        assert_relative_eq!(aspect_weighted_score(&[trine(2.0)]), 67.5);
        // orb under 1 degree multiplies the aspect points by 1.5
        assert_relative_eq!(aspect_weighted_score(&[trine(-0.5)]), 73.75);
        assert_relative_eq!(aspect_weighted_score(&[]), 40.0);
    }

    #[test]
    fn weighted_score_penalizes_challenges() {
        let square = Aspect {
            planet1: CelestialBody::Venus,
            planet2: CelestialBody::Mars,
            kind: AspectKind::Square,
            orb: 3.0,
            quality: AspectKind::Square.quality().to_string(),
            influence: AspectKind::Square.influence().to_string(),
        };
        // 40 - 2 * 2.0 per square, twice, then -4 for repeated Venus-Mars tension
        assert_relative_eq!(aspect_weighted_score(&[square.clone(), square]), 28.0);
    }

    #[test]
    fn placements_in_each_others_houses() {
        let chart1 = ChartSnapshot::new()
            .with_planet(CelestialBody::Sun, 45.0)
            .with_planet(CelestialBody::Uranus, 100.0)
            .with_equal_houses(0.0);
        let chart2 = ChartSnapshot::new()
            .with_planet(CelestialBody::Venus, 185.0)
            .with_planet(CelestialBody::Moon, 62.0);
        let (p2_in_p1, p1_in_p2) = house_placements(&chart1, &chart2);

        let descriptions: Vec<&str> = p2_in_p1.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Moon in 3rd house", "Venus in 7th house"]);
        assert!(p1_in_p2.is_empty());
    }

    #[test]
    fn zero_aspect_report_is_complete() {
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 5.0);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 245.0);
        let report = SynastryEngine::default().analyze(&chart1, &chart2).unwrap();

        assert!(report.aspects.is_empty());
        assert_relative_eq!(report.compatibility_score, 63.0);
        assert_eq!(report.compatibility_level, "Above Average");
        assert_eq!(
            report.relationship_summary,
            format!(
                "{} Nakshatra analysis shows your relationship is a FAR Mutual Growth. {}",
                summary_sentence(63.0),
                report.relationship.description
            )
        );
        assert_eq!(
            report.person2_influence,
            "In this FAR Mutual Growth, Person 2 serves as the Growth Experiencer."
        );
    }

    #[test]
    fn relationship_policy_uses_nakshatra_score() {
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 5.0);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 245.0);
        let engine = SynastryEngine::new(EngineConfig::legacy());
        let report = engine.analyze(&chart1, &chart2).unwrap();

        assert_relative_eq!(report.compatibility_score, 70.0);
        assert_eq!(report.compatibility_level, "Good");
    }

    #[test]
    fn catastrophic_input_is_an_error() {
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Moon, f64::NAN);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 5.0);
        let engine = SynastryEngine::default();

        assert!(engine.analyze(&chart1, &chart2).is_err());
        match engine.respond(&chart1, &chart2) {
            SynastryResponse::Error { error } => {
                assert_eq!(error, "Invalid longitude for Moon in chart 1: NaN")
            }
            other => panic!("expected an error response, got {:?}", other),
        }
    }
}

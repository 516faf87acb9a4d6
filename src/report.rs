use super::*;

/// Everything the engine works out for one chart pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryReport {
    pub compatibility_score: f64,
    pub compatibility_level: String,
    pub relationship_summary: String,
    pub dimensions: DimensionScores,
    pub relationship: NakshatraRelationship,
    /// `None` when either chart lacks a Moon.
    pub nakshatra_compatibility: Option<NakshatraCompatibility>,
    pub person1_influence: String,
    pub person2_influence: String,
    pub aspects: Vec<Aspect>,
    /// Person 2's bodies in person 1's houses.
    pub person2_in_person1_houses: Vec<HousePlacement>,
    /// Person 1's bodies in person 2's houses.
    pub person1_in_person2_houses: Vec<HousePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectRecord {
    pub name: String,
    pub orb: f64,
    pub summary: String,
}

/// Flat, lower-cased form of a [`SynastryReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryRecord {
    pub compatibility_score: i64,
    pub compatibility_level: String,
    pub relationship_summary: String,

    pub harmony_score: i64,
    pub harmony_level: String,
    pub harmony_summary: String,
    pub intimacy_score: i64,
    pub intimacy_level: String,
    pub intimacy_summary: String,
    pub passion_score: i64,
    pub passion_level: String,
    pub passion_summary: String,
    pub growth_score: i64,
    pub growth_level: String,
    pub growth_summary: String,
    pub karmic_bond_score: i64,
    pub karmic_bond_level: String,
    pub karmic_bond_summary: String,

    pub relationship_type: String,
    pub relationship_type_score: i64,

    pub p1p2_influence: String,
    pub p1p2_influence_sum: String,
    pub p2p1_influence: String,
    pub p2p1_influence_sum: String,

    pub aspects: Vec<AspectRecord>,
    pub p2p1house: Vec<String>,
    pub p1p2house: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SynastryResponse {
    Success(SynastryRecord),
    Error { error: String },
}

impl SynastryResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, SynastryResponse::Success(_))
    }
}

impl From<Result<SynastryReport, SynastryError>> for SynastryResponse {
    fn from(result: Result<SynastryReport, SynastryError>) -> Self {
        match result {
            Ok(report) => SynastryResponse::Success(report.to_record()),
            Err(e) => SynastryResponse::Error {
                error: e.to_string(),
            },
        }
    }
}

fn round_score(score: f64) -> i64 {
    score.round_ties_even() as i64
}

fn round_orb(orb: f64) -> f64 {
    (orb * 100.0).round_ties_even() / 100.0
}

impl SynastryReport {
    pub fn to_record(&self) -> SynastryRecord {
        let dims = &self.dimensions;
        let relationship = &self.relationship;
        let placements = |list: &[HousePlacement]| {
            list.iter()
                .map(|p| p.description.to_lowercase())
                .collect::<Vec<_>>()
        };

        SynastryRecord {
            compatibility_score: round_score(self.compatibility_score),
            compatibility_level: self.compatibility_level.to_lowercase(),
            relationship_summary: self.relationship_summary.clone(),

            harmony_score: round_score(dims.harmony.score),
            harmony_level: dims.harmony.label.to_string().to_lowercase(),
            harmony_summary: dims.harmony.description.clone(),
            intimacy_score: round_score(dims.intimacy.score),
            intimacy_level: dims.intimacy.label.to_string().to_lowercase(),
            intimacy_summary: dims.intimacy.description.clone(),
            passion_score: round_score(dims.passion.score),
            passion_level: dims.passion.label.to_string().to_lowercase(),
            passion_summary: dims.passion.description.clone(),
            growth_score: round_score(dims.growth.score),
            growth_level: dims.growth.label.to_string().to_lowercase(),
            growth_summary: dims.growth.description.clone(),
            karmic_bond_score: round_score(dims.karmic_bond.score),
            karmic_bond_level: dims.karmic_bond.label.to_string().to_lowercase(),
            karmic_bond_summary: dims.karmic_bond.description.clone(),

            relationship_type: relationship.combined_name.to_lowercase(),
            relationship_type_score: relationship.score as i64,

            p1p2_influence: relationship.person1.role.to_lowercase(),
            p1p2_influence_sum: self.person1_influence.clone(),
            p2p1_influence: relationship.person2.role.to_lowercase(),
            p2p1_influence_sum: self.person2_influence.clone(),

            aspects: self
                .aspects
                .iter()
                .map(|a| AspectRecord {
                    name: a.description().to_lowercase(),
                    orb: round_orb(a.orb),
                    summary: a.influence.to_lowercase(),
                })
                .collect(),
            p2p1house: placements(&self.person2_in_person1_houses),
            p1p2house: placements(&self.person1_in_person2_houses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_score(62.5), 62);
        assert_eq!(round_score(63.5), 64);
        assert_eq!(round_score(63.4), 63);
        assert_eq!(round_orb(2.0049), 2.0);
        assert_eq!(round_orb(-1.236), -1.24);
    }

    #[test]
    fn error_response_has_only_status_and_error() {
        let response = SynastryResponse::from(Err(SynastryError::HouseCuspCount {
            chart: 1,
            count: 4,
        }));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "error",
                "error": "Chart 1 has 4 house cusps, expected 12"
            })
        );
        assert!(!response.is_success());
    }

    #[test]
    fn success_record_is_flat_and_lowercase() {
        let chart1 = ChartSnapshot::new()
            .with_planet(CelestialBody::Sun, 123.0)
            .with_planet(CelestialBody::Moon, 5.0);
        let chart2 = ChartSnapshot::new().with_planet(CelestialBody::Moon, 245.0);
        let response = SynastryEngine::default().respond(&chart1, &chart2);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["relationship_type"], "far mutual growth");
        assert_eq!(json["p1p2_influence"], "developmental catalyst");
        assert_eq!(json["harmony_level"], "very good");
        assert_eq!(json["aspects"][0]["name"], "sun trine moon");
        assert_eq!(json["aspects"][0]["orb"], 2.0);
        assert_eq!(json["aspects"][0]["summary"], "flow, harmony, ease");
        assert!(json.get("karmic_bond_score").is_some());
        assert!(json.get("error").is_none());
    }
}

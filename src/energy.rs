use super::*;

/// Same-body contact between the two charts, for the bodies tied to a relationship type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyInteraction {
    pub strength: i32,
    pub planets: Vec<CelestialBody>,
    pub description: String,
}

/// (target angle, window, points). First window that contains the separation wins.
const CONTACT_WINDOWS: [(f64, f64, i32); 5] = [
    (0.0, 10.0, 8),
    (60.0, 6.0, 5),
    (90.0, 8.0, 3),
    (120.0, 8.0, 7),
    (180.0, 10.0, 4),
];

impl RelationshipType {
    pub fn energy_planets(&self) -> &'static [CelestialBody] {
        use CelestialBody::*;
        match self {
            RelationshipType::SoulConnection => &[Moon, Sun],
            RelationshipType::KarmicBond => &[Saturn, Moon, Sun],
            RelationshipType::MutualGrowth => &[Jupiter, Venus],
            RelationshipType::FriendlyBonds => &[Venus, Mercury],
            RelationshipType::BindingForces => &[Saturn, Mars],
            RelationshipType::DynamicTension => &[Mars, Uranus],
        }
    }

    pub fn energy_modifier(&self) -> f64 {
        match self {
            RelationshipType::SoulConnection => 1.2,
            RelationshipType::KarmicBond => 1.0,
            RelationshipType::MutualGrowth => 1.1,
            RelationshipType::FriendlyBonds => 0.9,
            RelationshipType::BindingForces => 0.8,
            RelationshipType::DynamicTension => 1.1,
        }
    }
}

fn contact_points(separation: f64) -> Option<i32> {
    CONTACT_WINDOWS
        .iter()
        .find(|(angle, window, _)| (separation - angle).abs() < *window)
        .map(|&(_, _, points)| points)
}

impl EnergyInteraction {
    pub fn calculate(
        chart1: &dyn ChartPositions,
        chart2: &dyn ChartPositions,
        kind: RelationshipType,
    ) -> Self {
        let mut total = 0;
        let mut planets = Vec::new();

        for &body in kind.energy_planets() {
            let (Some(lon1), Some(lon2)) = (chart1.longitude(body), chart2.longitude(body)) else {
                continue;
            };
            if let Some(points) = contact_points(angular_separation(lon1, lon2)) {
                total += points;
                planets.push(body);
            }
        }

        let strength = (total as f64 * kind.energy_modifier()) as i32;
        EnergyInteraction {
            strength,
            planets,
            description: Self::describe(strength).to_string(),
        }
    }

    pub fn describe(strength: i32) -> &'static str {
        match strength {
            s if s >= 15 => {
                "Extremely strong planetary energy between you enhances your relationship."
            }
            s if s >= 10 => "Strong planetary energy supports your connection.",
            s if s >= 5 => "Moderate planetary energy exists between you.",
            _ => "The planetary energy between you is subtle and may require attention to develop.",
        }
    }

    pub fn involves(&self, body: CelestialBody) -> bool {
        self.planets.contains(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soul_connection_energy() {
        let chart1 = ChartSnapshot::new()
            .with_planet(CelestialBody::Moon, 0.0)
            .with_planet(CelestialBody::Sun, 0.0);
        let chart2 = ChartSnapshot::new()
            .with_planet(CelestialBody::Moon, 0.0)
            .with_planet(CelestialBody::Sun, 120.0);
        let energy = EnergyInteraction::calculate(&chart1, &chart2, RelationshipType::SoulConnection);

        assert_eq!(energy.strength, 18);
        assert_eq!(energy.planets, vec![CelestialBody::Moon, CelestialBody::Sun]);
        assert_eq!(
            energy.description,
            "Extremely strong planetary energy between you enhances your relationship."
        );
    }

    #[test]
    fn dynamic_tension_energy_truncates() {
        let chart1 = ChartSnapshot::new()
            .with_planet(CelestialBody::Mars, 0.0)
            .with_planet(CelestialBody::Uranus, 0.0);
        let chart2 = ChartSnapshot::new()
            .with_planet(CelestialBody::Mars, 95.0)
            .with_planet(CelestialBody::Uranus, 185.0);
        let energy = EnergyInteraction::calculate(&chart1, &chart2, RelationshipType::DynamicTension);

        // (3 + 4) * 1.1
        assert_eq!(energy.strength, 7);
        assert_eq!(energy.description, "Moderate planetary energy exists between you.");
    }

    #[test]
    fn windows_are_strict() {
        assert_eq!(contact_points(9.99), Some(8));
        assert_eq!(contact_points(10.0), None);
        assert_eq!(contact_points(54.0), None);
        assert_eq!(contact_points(65.9), Some(5));
        assert_eq!(contact_points(170.5), Some(4));
        assert_eq!(contact_points(40.0), None);
    }

    #[test]
    fn missing_bodies_contribute_nothing() {
        let chart1 = ChartSnapshot::new().with_planet(CelestialBody::Venus, 10.0);
        let chart2 = ChartSnapshot::new();
        let energy = EnergyInteraction::calculate(&chart1, &chart2, RelationshipType::FriendlyBonds);
        assert_eq!(energy.strength, 0);
        assert!(energy.planets.is_empty());
        assert_eq!(
            energy.description,
            "The planetary energy between you is subtle and may require attention to develop."
        );
    }
}

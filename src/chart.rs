use super::*;
use std::collections::BTreeMap;

/// Read-only view of one person's chart.
///
/// Anything that can report ecliptic longitudes and resolve a longitude to a house can be
/// fed to the engine. Bodies that are not available return `None` and are skipped.
pub trait ChartPositions {
    fn longitude(&self, body: CelestialBody) -> Option<f64>;

    fn house_of(&self, longitude: f64) -> Option<House>;

    /// Rejects charts the engine cannot score at all. `chart` is 1 or 2 and only shows up
    /// in the error.
    fn validate(&self, chart: u8) -> Result<(), SynastryError> {
        for body in CelestialBody::iter() {
            if let Some(value) = self.longitude(body) {
                if !value.is_finite() {
                    return Err(SynastryError::InvalidLongitude { chart, body, value });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    #[serde(default)]
    pub planets: BTreeMap<CelestialBody, f64>,
    /// Cusps of houses 1 through 12 in degrees. Empty when the birth time is unknown.
    #[serde(default)]
    pub houses: Vec<f64>,
}

impl ChartSnapshot {
    pub fn new() -> Self {
        ChartSnapshot::default()
    }

    pub fn with_planet(mut self, body: CelestialBody, longitude: f64) -> Self {
        self.planets.insert(body, longitude);
        self
    }

    pub fn with_houses(mut self, cusps: Vec<f64>) -> Self {
        self.houses = cusps;
        self
    }

    /// Twelve 30 degree houses starting at the ascendant.
    pub fn with_equal_houses(self, ascendant: f64) -> Self {
        let cusps = (0..12)
            .map(|i| (ascendant + 30.0 * i as f64).rem_euclid(360.0))
            .collect();
        self.with_houses(cusps)
    }

    pub fn from_json(input: &str) -> Result<Self, SynastryError> {
        serde_json::from_str(input).map_err(|e| SynastryError::Chart(e.to_string()))
    }
}

impl ChartPositions for ChartSnapshot {
    fn longitude(&self, body: CelestialBody) -> Option<f64> {
        self.planets.get(&body).copied()
    }

    fn house_of(&self, longitude: f64) -> Option<House> {
        if self.houses.len() != 12 || !longitude.is_finite() {
            return None;
        }
        let position = longitude.rem_euclid(360.0);
        (0..12).find_map(|i| {
            let start = self.houses[i];
            let end = self.houses[(i + 1) % 12];
            let span = (end - start).rem_euclid(360.0);
            let offset = (position - start).rem_euclid(360.0);
            if offset < span {
                House::from_index(i + 1)
            } else {
                None
            }
        })
    }

    fn validate(&self, chart: u8) -> Result<(), SynastryError> {
        for (&body, &value) in &self.planets {
            if !value.is_finite() {
                return Err(SynastryError::InvalidLongitude { chart, body, value });
            }
        }
        if !self.houses.is_empty() && self.houses.len() != 12 {
            return Err(SynastryError::HouseCuspCount {
                chart,
                count: self.houses.len(),
            });
        }
        if let Some((index, &value)) = self
            .houses
            .iter()
            .enumerate()
            .find(|(_, cusp)| !cusp.is_finite())
        {
            return Err(SynastryError::InvalidHouseCusp {
                chart,
                index: index + 1,
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_houses_lookup() {
        let chart = ChartSnapshot::new().with_equal_houses(15.0);
        assert_eq!(chart.house_of(15.0), Some(House::First));
        assert_eq!(chart.house_of(44.9), Some(House::First));
        assert_eq!(chart.house_of(45.0), Some(House::Second));
        assert_eq!(chart.house_of(10.0), Some(House::Twelfth));
        assert_eq!(chart.house_of(375.0), Some(House::First));
    }

    #[test]
    fn unequal_houses_wrap_past_aries() {
        let cusps = vec![
            350.0, 20.0, 50.0, 80.0, 110.0, 140.0, 170.0, 200.0, 230.0, 260.0, 290.0, 320.0,
        ];
        let chart = ChartSnapshot::new().with_houses(cusps);
        assert_eq!(chart.house_of(355.0), Some(House::First));
        assert_eq!(chart.house_of(5.0), Some(House::First));
        assert_eq!(chart.house_of(20.0), Some(House::Second));
        assert_eq!(chart.house_of(349.0), Some(House::Twelfth));
    }

    #[test]
    fn no_houses_means_no_lookup() {
        let chart = ChartSnapshot::new().with_planet(CelestialBody::Sun, 10.0);
        assert_eq!(chart.house_of(10.0), None);
        assert!(chart.validate(1).is_ok());
    }

    #[test]
    fn invalid_charts_are_rejected() {
        let chart = ChartSnapshot::new().with_planet(CelestialBody::Mars, f64::NAN);
        assert!(matches!(
            chart.validate(2),
            Err(SynastryError::InvalidLongitude {
                chart: 2,
                body: CelestialBody::Mars,
                ..
            })
        ));

        let chart = ChartSnapshot::new().with_houses(vec![0.0, 30.0, 60.0]);
        assert_eq!(
            chart.validate(1),
            Err(SynastryError::HouseCuspCount { chart: 1, count: 3 })
        );

        let mut cusps: Vec<f64> = (0..12).map(|i| i as f64 * 30.0).collect();
        cusps[4] = f64::INFINITY;
        let chart = ChartSnapshot::new().with_houses(cusps);
        assert!(matches!(
            chart.validate(1),
            Err(SynastryError::InvalidHouseCusp { index: 5, .. })
        ));
    }

    #[test]
    fn parses_json_snapshot() {
        let chart = ChartSnapshot::from_json(r#"{"planets": {"Sun": 12.5, "Moon": 200.0}}"#)
            .unwrap();
        assert_eq!(chart.longitude(CelestialBody::Sun), Some(12.5));
        assert_eq!(chart.longitude(CelestialBody::Venus), None);
        assert!(chart.houses.is_empty());

        assert!(ChartSnapshot::from_json(r#"{"planets": {"Vulcan": 1.0}}"#).is_err());
    }
}

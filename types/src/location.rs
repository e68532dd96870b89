//! Where a reported problem is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A post's location: either free text or a `"lat,lon"` pair.
///
/// The wire form is always the text as entered (trimmed); coordinates are
/// recognised on parse but never re-rendered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
    Text(String),
    Coordinates { lat: f64, lon: f64, raw: String },
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some((lat, lon)) = raw.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
                    return Self::Coordinates {
                        lat,
                        lon,
                        raw: raw.to_string(),
                    };
                }
            }
        }
        Self::Text(raw.to_string())
    }

    /// The text as entered.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(raw) | Self::Coordinates { raw, .. } => raw,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Self::Coordinates { lat, lon, .. } => Some((*lat, *lon)),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Location {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Location> for String {
    fn from(l: Location) -> Self {
        l.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_lon_parses_to_coordinates() {
        let loc = Location::parse("40.7128, -74.0060");
        assert_eq!(loc.coordinates(), Some((40.7128, -74.006)));
        assert_eq!(loc.to_string(), "40.7128, -74.0060");
    }

    #[test]
    fn coordinates_keep_the_entered_text() {
        for raw in ["12.50, -3.25", "1e1,2e1"] {
            let loc = Location::parse(raw);
            assert!(loc.coordinates().is_some());
            assert_eq!(loc.as_str(), raw);
            assert_eq!(String::from(loc), raw);
        }
        assert_eq!(Location::parse("1e1,2e1").coordinates(), Some((10.0, 20.0)));
    }

    #[test]
    fn street_address_with_comma_stays_text() {
        let loc = Location::parse("12 Elm St, Springfield");
        assert_eq!(loc, Location::Text("12 Elm St, Springfield".into()));
        assert_eq!(loc.coordinates(), None);
    }

    #[test]
    fn out_of_range_pair_stays_text() {
        assert!(matches!(Location::parse("123,456"), Location::Text(_)));
    }
}

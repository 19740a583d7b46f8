//! Regional renewable-resource potential
//!
//! Stands in for a resource-density map: a coordinate is looked up against
//! named bounding boxes to get
//! - a potential class (high / coastal advantage / standard) → geography bonus
//! - whether it lies in a coastal zone → water availability, export advice
//! - whether the jurisdiction has strong hydrogen policy support
//!
//! The lookup sits behind [`RegionPotentialProvider`]; [`RegionTable`] is the
//! data-driven implementation and can be loaded from JSON to retarget the
//! scorer to another jurisdiction.

use crate::{Coordinate, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Resource potential class of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionPotential {
    /// Dense solar/wind resource (e.g. Gujarat, Rajasthan)
    High,
    /// Coastal advantage (export access, offshore wind)
    Coastal,
    /// Anywhere else
    Standard,
}

/// What the provider knows about one coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub potential: RegionPotential,
    /// Name of the matched region, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub coastal: bool,
    pub strong_policy_support: bool,
}

impl RegionProfile {
    /// Profile for a coordinate no table covers
    pub fn standard() -> Self {
        Self {
            potential: RegionPotential::Standard,
            region: None,
            coastal: false,
            strong_policy_support: false,
        }
    }
}

/// Lookup seam used by the scorer
pub trait RegionPotentialProvider: Send + Sync {
    fn profile(&self, coordinate: &Coordinate) -> RegionProfile;
}

/// Inclusive lat/lon box (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        c.latitude >= self.lat_min
            && c.latitude <= self.lat_max
            && c.longitude >= self.lon_min
            && c.longitude <= self.lon_max
    }
}

/// A named region with its potential class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub bounds: BoundingBox,
    pub potential: RegionPotential,
}

/// Bounding-box region table
///
/// Regions are checked in order and the first match wins, so list the more
/// specific (higher potential) boxes first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    #[serde(default)]
    pub regions: Vec<RegionEntry>,
    #[serde(default)]
    pub coastal_zones: Vec<BoundingBox>,
    #[serde(default)]
    pub strong_policy_zones: Vec<BoundingBox>,
}

impl RegionTable {
    /// Table with no regions: every coordinate is standard, inland, moderate policy
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table for India
    pub fn india() -> Self {
        let mut table = Self::empty();

        // High renewable potential states
        table.add_region("Gujarat", BoundingBox::new(20.0, 24.0, 68.0, 74.0), RegionPotential::High);
        table.add_region("Rajasthan", BoundingBox::new(24.0, 30.0, 69.0, 78.0), RegionPotential::High);
        table.add_region("Maharashtra", BoundingBox::new(16.0, 21.0, 72.0, 80.0), RegionPotential::High);

        // Coastal advantage
        table.add_region("Tamil Nadu", BoundingBox::new(8.0, 15.0, 76.0, 82.0), RegionPotential::Coastal);
        table.add_region("Karnataka", BoundingBox::new(11.0, 16.0, 74.0, 78.0), RegionPotential::Coastal);

        // Coastal strips (water access, export terminals)
        table.coastal_zones = vec![
            BoundingBox::new(20.0, 24.5, 68.0, 73.0), // Gujarat coast
            BoundingBox::new(8.0, 20.5, 72.5, 75.5),  // Konkan / Malabar
            BoundingBox::new(8.0, 22.0, 79.5, 87.5),  // Coromandel / east coast
        ];

        // National Green Hydrogen Mission applies country-wide
        table.strong_policy_zones = vec![BoundingBox::new(6.5, 35.5, 68.0, 97.5)];

        table
    }

    /// Load a table from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading region table from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let table: Self = serde_json::from_reader(reader)?;

        info!(
            "Loaded {} regions, {} coastal zones, {} policy zones",
            table.regions.len(),
            table.coastal_zones.len(),
            table.strong_policy_zones.len()
        );

        Ok(table)
    }

    fn add_region(&mut self, name: &str, bounds: BoundingBox, potential: RegionPotential) {
        self.regions.push(RegionEntry {
            name: name.to_string(),
            bounds,
            potential,
        });
    }
}

impl RegionPotentialProvider for RegionTable {
    fn profile(&self, coordinate: &Coordinate) -> RegionProfile {
        let matched = self.regions.iter().find(|r| r.bounds.contains(coordinate));

        RegionProfile {
            potential: matched
                .map(|r| r.potential)
                .unwrap_or(RegionPotential::Standard),
            region: matched.map(|r| r.name.clone()),
            coastal: self.coastal_zones.iter().any(|b| b.contains(coordinate)),
            strong_policy_support: self
                .strong_policy_zones
                .iter()
                .any(|b| b.contains(coordinate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_india_high_potential_regions() {
        let table = RegionTable::india();

        // Ahmedabad
        let p = table.profile(&at(23.0225, 72.5714));
        assert_eq!(p.potential, RegionPotential::High);
        assert_eq!(p.region.as_deref(), Some("Gujarat"));
        assert!(p.coastal);
        assert!(p.strong_policy_support);

        // Jaisalmer
        let p = table.profile(&at(26.9157, 70.9083));
        assert_eq!(p.potential, RegionPotential::High);
        assert_eq!(p.region.as_deref(), Some("Rajasthan"));
        assert!(!p.coastal);
    }

    #[test]
    fn test_india_coastal_region() {
        let table = RegionTable::india();

        // Madurai falls in the Tamil Nadu box
        let p = table.profile(&at(9.9252, 78.1198));
        assert_eq!(p.potential, RegionPotential::Coastal);
        assert_eq!(p.region.as_deref(), Some("Tamil Nadu"));
    }

    #[test]
    fn test_india_standard_region() {
        let table = RegionTable::india();

        // Jamshedpur: in India, no bonus region
        let p = table.profile(&at(22.8046, 86.2029));
        assert_eq!(p.potential, RegionPotential::Standard);
        assert!(p.region.is_none());
        assert!(p.strong_policy_support);
    }

    #[test]
    fn test_outside_table() {
        let table = RegionTable::india();

        // London
        let p = table.profile(&at(51.5074, -0.1278));
        assert_eq!(p, RegionProfile::standard());

        let empty = RegionTable::empty();
        assert_eq!(empty.profile(&at(23.0225, 72.5714)), RegionProfile::standard());
    }

    #[test]
    fn test_first_match_wins() {
        let table = RegionTable::india();

        // 20.5N 73E sits in both the Gujarat and Maharashtra boxes
        let p = table.profile(&at(20.5, 73.0));
        assert_eq!(p.region.as_deref(), Some("Gujarat"));
    }

    #[test]
    fn test_load_region_table_from_json() {
        let json = r#"{
            "regions": [
                {"name": "Pilbara", "bounds": {"lat_min": -24.0, "lat_max": -19.0, "lon_min": 115.0, "lon_max": 122.0}, "potential": "High"}
            ],
            "coastal_zones": [
                {"lat_min": -22.0, "lat_max": -19.0, "lon_min": 115.0, "lon_max": 121.0}
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let table = RegionTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.regions.len(), 1);
        assert!(table.strong_policy_zones.is_empty());

        let p = table.profile(&at(-20.3, 118.6)); // Port Hedland
        assert_eq!(p.potential, RegionPotential::High);
        assert!(p.coastal);
        assert!(!p.strong_policy_support);
    }

    #[test]
    fn test_shipped_india_table_matches_builtin() {
        let shipped: RegionTable =
            serde_json::from_str(include_str!("../../../data/regions_india.json")).unwrap();
        assert_eq!(shipped, RegionTable::india());
    }
}

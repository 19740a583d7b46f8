//! Green Hydrogen Site Scorer
//!
//! Scores a candidate coordinate for green-hydrogen production by aggregating
//! nearby renewable sources and industrial demand centers into a bounded
//! suitability score, plus derived impact metrics and recommendations.
//!
//! # Scoring Model (weighted contributions + additive bonuses)
//!
//! ```text
//! Score(site) = clamp(w_R·R + w_D·D + B_region + B_industry, 20, 100)
//! ```
//!
//! | Term       | Value        | Description |
//! |------------|--------------|-------------|
//! | R          | 0-100        | Renewable access (distance decay + capacity band) |
//! | D          | 0-100        | Demand proximity (distance decay × level + diversity) |
//! | w_R, w_D   | 0.40, 0.40   | Contribution weights |
//! | B_region   | 0 / 10 / 15  | Region potential (standard / coastal / high) |
//! | B_industry | 15           | Heavy industry (steel, chemical, refinery) nearby |
//!
//! # Data Flow
//!
//! 1. [`loader`] reads renewable sources and demand centers into a catalog
//! 2. [`proximity`] annotates the catalog with distances and keeps what is in range
//! 3. [`scorer`] turns the nearby signals into a [`SiteAnalysis`]
//! 4. [`ranking`] repeats 2-3 for a batch of candidate sites

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

pub mod jitter;
pub mod loader;
pub mod metrics;
pub mod proximity;
pub mod ranking;
pub mod region;
pub mod scorer;

pub use jitter::{JitterSource, NoJitter, SeededJitter};
pub use proximity::{NearbyInfrastructure, ProximityRadii};
pub use region::{RegionPotential, RegionPotentialProvider, RegionProfile, RegionTable};
pub use scorer::{score_site, ScoringPolicy, SiteScorer};

/// Earth radius in km (9 decimal precision)
pub const EARTH_RADIUS_KM: f64 = 6371.000000000;

/// Renewable sources further than this are not scoring inputs (9 decimal precision)
pub const RENEWABLE_RADIUS_KM: f64 = 100.000000000;

/// Demand centers further than this are not scoring inputs (9 decimal precision)
pub const DEMAND_RADIUS_KM: f64 = 150.000000000;

/// Maximum number of signals of each kind handed to the scorer
pub const MAX_NEARBY_SIGNALS: usize = 5;

#[derive(Error, Debug)]
pub enum SitingError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    InvalidLatitude(f64),
    #[error("Longitude out of range [-180, 180]: {0}")]
    InvalidLongitude(f64),
    #[error("Coordinate is not numeric: {0:?}")]
    NonNumericCoordinate(String),
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),
    #[error("Invalid scoring policy: {0}")]
    InvalidPolicy(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SitingError {
    /// True for errors caused by caller input rather than by I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SitingError::InvalidLatitude(_)
                | SitingError::InvalidLongitude(_)
                | SitingError::NonNumericCoordinate(_)
                | SitingError::InvalidSignal(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SitingError>;

/// A validated point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SitingError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SitingError::InvalidLongitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    /// Parse decimal-string coordinates as stored by the data layer
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_decimal(latitude)?;
        let lon = parse_decimal(longitude)?;
        Self::new(lat, lon)
    }

    /// Parse a number-or-string lat/lon pair
    pub fn from_values(latitude: &DecimalValue, longitude: &DecimalValue) -> Result<Self> {
        Self::parse(&latitude.as_text(), &longitude.as_text())
    }

    /// Re-check the range invariant (fields are public, so callers can bypass `new`)
    pub fn validate(&self) -> Result<()> {
        Self::new(self.latitude, self.longitude).map(|_| ())
    }

    /// Great-circle distance to another coordinate in km
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_km(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

fn parse_decimal(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SitingError::NonNumericCoordinate(raw.to_string()))
}

/// Numeric value as it arrives from storage or clients: a JSON number or a
/// decimal string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecimalValue {
    Number(f64),
    Text(String),
}

impl DecimalValue {
    pub fn as_text(&self) -> String {
        match self {
            DecimalValue::Number(n) => n.to_string(),
            DecimalValue::Text(s) => s.clone(),
        }
    }
}

/// Renewable generation technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenewableKind {
    Wind,
    Solar,
    Hydro,
    Other,
}

impl RenewableKind {
    /// Classify free-form storage labels ("wind", "Wind Farm", "Solar Park", ...)
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("wind") {
            RenewableKind::Wind
        } else if label.contains("solar") {
            RenewableKind::Solar
        } else if label.contains("hydro") {
            RenewableKind::Hydro
        } else {
            RenewableKind::Other
        }
    }
}

/// Intensity of hydrogen demand at an industrial site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandLevel {
    Low,
    Medium,
    High,
}

impl DemandLevel {
    /// Parse "low" / "Medium" / "HIGH" etc.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Ok(DemandLevel::Low),
            "medium" => Ok(DemandLevel::Medium),
            "high" => Ok(DemandLevel::High),
            other => Err(SitingError::InvalidSignal(format!(
                "unknown demand level {:?}",
                other
            ))),
        }
    }
}

/// A renewable source within range of the candidate, annotated with its distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewableSignal {
    pub kind: RenewableKind,
    pub distance_km: f64,
    pub capacity_mw: f64,
}

impl RenewableSignal {
    pub fn new(kind: RenewableKind, distance_km: f64, capacity_mw: f64) -> Self {
        Self {
            kind,
            distance_km,
            capacity_mw,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("renewable distance_km", self.distance_km)?;
        check_non_negative("renewable capacity_mw", self.capacity_mw)
    }
}

/// A demand center within range of the candidate, annotated with its distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandSignal {
    /// Industry category ("steel", "Chemical Plant", "Port", ...)
    pub sector: String,
    pub distance_km: f64,
    pub level: DemandLevel,
}

impl DemandSignal {
    pub fn new(sector: impl Into<String>, distance_km: f64, level: DemandLevel) -> Self {
        Self {
            sector: sector.into(),
            distance_km,
            level,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("demand distance_km", self.distance_km)
    }

    /// Steel, chemical and refinery sites are large hydrogen offtakers
    pub fn is_heavy_industry(&self) -> bool {
        let sector = self.sector.to_lowercase();
        ["steel", "chemical", "refinery"]
            .iter()
            .any(|k| sector.contains(k))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SitingError::InvalidSignal(format!(
            "{} must be a finite value >= 0, got {}",
            field, value
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportCost {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandProximity {
    Excellent,
    Good,
    Fair,
    Limited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterAvailability {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegulatorySupport {
    Strong,
    Moderate,
}

/// Qualitative factor ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFactors {
    /// Renewable contribution on a 0-100 scale
    pub renewable_access: u8,
    pub transport_cost: TransportCost,
    pub demand_proximity: DemandProximity,
    pub water_availability: WaterAvailability,
    pub regulatory_support: RegulatorySupport,
}

/// Result of scoring one candidate coordinate
///
/// Serialized with camelCase keys; this is the shape API consumers and
/// site records already expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAnalysis {
    /// Composite score (20-100)
    pub suitability_score: u8,
    pub factors: SiteFactors,
    /// Never empty
    pub recommendations: Vec<String>,
    /// Tons of CO₂ per year
    pub co2_saved_annually: u32,
    /// Capped at 20
    pub industries_supported: u32,
    /// Percent, capped at 95
    pub renewable_utilization: u8,
}

/// Haversine distance between two points in km (9 decimal precision)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.000000000;
    let lat2_rad = lat2 * PI / 180.000000000;
    let dlat = (lat2 - lat1) * PI / 180.000000000;
    let dlon = (lon2 - lon1) * PI / 180.000000000;

    let a = (dlat / 2.000000000).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.000000000).sin().powi(2);
    // Rounding can push near-antipodal points just past 1.0
    let a = a.clamp(0.000000000, 1.000000000);
    let c = 2.000000000 * a.sqrt().atan2((1.000000000 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two validated coordinates in km
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_haversine() {
        // Mumbai to Ahmedabad: ~440 km
        let dist = haversine_km(19.076000000, 72.877700000, 23.022500000, 72.571400000);
        assert!((dist - 440.000000000).abs() < 15.000000000, "got {}", dist);

        // Same point: 0 km
        let dist = haversine_km(0.000000000, 0.000000000, 0.000000000, 0.000000000);
        assert!(dist.abs() < 0.001000000);
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(23.0225, 72.5714).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());

        assert!(matches!(
            Coordinate::new(200.0, 72.0),
            Err(SitingError::InvalidLatitude(v)) if v == 200.0
        ));
        assert!(matches!(
            Coordinate::new(20.0, -180.5),
            Err(SitingError::InvalidLongitude(_))
        ));
        assert!(matches!(
            Coordinate::new(f64::NAN, 0.0),
            Err(SitingError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_coordinate_parse() {
        let c = Coordinate::parse("23.0225", " 72.5714 ").unwrap();
        assert_eq!(c.latitude, 23.0225);
        assert_eq!(c.longitude, 72.5714);

        let err = Coordinate::parse("north", "72.0").unwrap_err();
        assert!(matches!(err, SitingError::NonNumericCoordinate(_)));
        assert!(err.is_validation());

        assert!(matches!(
            Coordinate::parse("95.0", "72.0"),
            Err(SitingError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_coordinate_from_mixed_values() {
        let lat: DecimalValue = serde_json::from_str("\"23.0225\"").unwrap();
        let lon: DecimalValue = serde_json::from_str("72.5714").unwrap();
        let c = Coordinate::from_values(&lat, &lon).unwrap();
        assert_eq!(c.latitude, 23.0225);
        assert_eq!(c.longitude, 72.5714);

        assert!(serde_json::from_str::<DecimalValue>("true").is_err());
        assert!(matches!(
            Coordinate::from_values(&DecimalValue::Text("n/a".into()), &lon),
            Err(SitingError::NonNumericCoordinate(_))
        ));
    }

    #[test]
    fn test_renewable_kind_from_label() {
        assert_eq!(RenewableKind::from_label("wind"), RenewableKind::Wind);
        assert_eq!(RenewableKind::from_label("Wind Farm"), RenewableKind::Wind);
        assert_eq!(RenewableKind::from_label("Solar Farm"), RenewableKind::Solar);
        assert_eq!(RenewableKind::from_label("hydro"), RenewableKind::Hydro);
        assert_eq!(RenewableKind::from_label("geothermal"), RenewableKind::Other);
    }

    #[test]
    fn test_demand_level_from_label() {
        assert_eq!(DemandLevel::from_label("high").unwrap(), DemandLevel::High);
        assert_eq!(DemandLevel::from_label("Medium").unwrap(), DemandLevel::Medium);
        assert_eq!(DemandLevel::from_label(" LOW ").unwrap(), DemandLevel::Low);
        assert!(DemandLevel::from_label("extreme").is_err());
    }

    #[test]
    fn test_heavy_industry_detection() {
        assert!(DemandSignal::new("Steel Manufacturing", 10.0, DemandLevel::High).is_heavy_industry());
        assert!(DemandSignal::new("chemical", 10.0, DemandLevel::Low).is_heavy_industry());
        assert!(DemandSignal::new("Refinery", 10.0, DemandLevel::Medium).is_heavy_industry());
        assert!(!DemandSignal::new("Port", 10.0, DemandLevel::High).is_heavy_industry());
    }

    #[test]
    fn test_signal_validation() {
        assert!(RenewableSignal::new(RenewableKind::Wind, 0.0, 0.0).validate().is_ok());
        assert!(RenewableSignal::new(RenewableKind::Wind, -1.0, 10.0).validate().is_err());
        assert!(RenewableSignal::new(RenewableKind::Solar, 1.0, f64::NAN).validate().is_err());
        assert!(DemandSignal::new("Port", f64::INFINITY, DemandLevel::Low).validate().is_err());
    }

    #[test]
    fn test_site_analysis_wire_format() {
        let analysis = SiteAnalysis {
            suitability_score: 72,
            factors: SiteFactors {
                renewable_access: 64,
                transport_cost: TransportCost::Medium,
                demand_proximity: DemandProximity::Good,
                water_availability: WaterAvailability::VeryGood,
                regulatory_support: RegulatorySupport::Strong,
            },
            recommendations: vec!["x".to_string()],
            co2_saved_annually: 160_000,
            industries_supported: 4,
            renewable_utilization: 52,
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["suitabilityScore"], 72);
        assert_eq!(json["factors"]["renewableAccess"], 64);
        assert_eq!(json["factors"]["waterAvailability"], "Very Good");
        assert_eq!(json["factors"]["transportCost"], "Medium");
        assert_eq!(json["co2SavedAnnually"], 160_000);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate {
            latitude: lat,
            longitude: lon,
        })
    }

    proptest! {
        #[test]
        fn fuzz_distance_to_self_is_zero(a in coordinate()) {
            prop_assert!(distance_km(&a, &a).abs() < 1e-9);
        }

        #[test]
        fn fuzz_distance_symmetric_non_negative(a in coordinate(), b in coordinate()) {
            let ab = distance_km(&a, &b);
            let ba = distance_km(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6, "{} vs {}", ab, ba);
            // Never more than half the circumference
            prop_assert!(ab <= PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}

//! Infrastructure catalog loading from JSON files
//!
//! Rows follow the storage layout: `name`, `type`, `latitude`, `longitude`
//! (decimal strings or numbers), plus `capacity` for renewable sources and
//! `demandLevel` for demand centers. Bad rows are skipped, not fatal.

use crate::{Coordinate, DecimalValue, DemandLevel, RenewableKind, Result, SitingError};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Capacity assumed for a renewable source stored without one (MW)
pub const DEFAULT_CAPACITY_MW: f64 = 100.0;

/// Sanitize ID to prevent injection (alphanumeric, dash, underscore only)
fn sanitize_id(id: String) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(128)
        .collect()
}

/// Sanitize display names (wider charset, still bounded)
fn sanitize_name(name: String) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || " -_.,()&'/".contains(*c))
        .take(256)
        .collect()
}

/// A renewable generation site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableSource {
    pub id: String,
    pub name: String,
    pub kind: RenewableKind,
    pub location: Coordinate,
    pub capacity_mw: f64,
}

/// An industrial hydrogen consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandCenter {
    pub id: String,
    pub name: String,
    /// Industry category as stored ("Steel Manufacturing", "Port", ...)
    pub sector: String,
    pub location: Coordinate,
    pub level: DemandLevel,
}

/// Everything the proximity filter searches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureCatalog {
    pub renewables: Vec<RenewableSource>,
    pub demand_centers: Vec<DemandCenter>,
}

#[derive(Debug, Deserialize)]
struct RawRenewableSource {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    kind: Option<String>,
    latitude: Option<DecimalValue>,
    longitude: Option<DecimalValue>,
    #[serde(alias = "capacity_mw")]
    capacity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDemandCenter {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type", alias = "sector")]
    sector: Option<String>,
    latitude: Option<DecimalValue>,
    longitude: Option<DecimalValue>,
    #[serde(rename = "demandLevel", alias = "demand_level")]
    demand_level: Option<String>,
}

/// Parse a stored lat/lon pair; `None` when either side is missing
fn parse_location(
    latitude: Option<&DecimalValue>,
    longitude: Option<&DecimalValue>,
) -> Option<Result<Coordinate>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(Coordinate::from_values(lat, lon)),
        _ => None,
    }
}

/// Read a JSON array, or the array under `field` of a wrapping object
///
/// Rows stay untyped so one malformed row cannot fail the whole file.
fn read_rows(path: &Path, field: &str) -> Result<Vec<serde_json::Value>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: serde_json::Value = serde_json::from_reader(reader)?;

    let rows = match raw {
        serde_json::Value::Array(rows) => Some(rows),
        serde_json::Value::Object(mut map) => match map.remove(field) {
            Some(serde_json::Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    };

    if let Some(rows) = rows {
        Ok(rows)
    } else {
        Err(SitingError::Json(serde_json::Error::custom(format!(
            "expected an array or an object with a {:?} field",
            field
        ))))
    }
}

/// Load renewable sources from JSON file
pub fn load_renewable_sources(path: impl AsRef<Path>) -> Result<Vec<RenewableSource>> {
    let path = path.as_ref();
    info!("Loading renewable sources from {:?}", path);

    let rows = read_rows(path, "renewable_sources")?;

    let mut sources = Vec::new();
    let mut skipped = 0;

    for (i, value) in rows.into_iter().enumerate() {
        let row: RawRenewableSource = match serde_json::from_value(value) {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping renewable source #{}: {}", i, e);
                skipped += 1;
                continue;
            }
        };

        let location = match parse_location(row.latitude.as_ref(), row.longitude.as_ref()) {
            Some(Ok(c)) => c,
            Some(Err(e)) => {
                warn!("Skipping renewable source #{}: {}", i, e);
                skipped += 1;
                continue;
            }
            None => {
                warn!("Skipping renewable source #{}: missing coordinates", i);
                skipped += 1;
                continue;
            }
        };

        let capacity_mw = row.capacity.unwrap_or(DEFAULT_CAPACITY_MW);
        if !(capacity_mw.is_finite() && capacity_mw >= 0.0) {
            warn!("Skipping renewable source #{}: capacity {}", i, capacity_mw);
            skipped += 1;
            continue;
        }

        sources.push(RenewableSource {
            id: sanitize_id(row.id.unwrap_or_else(|| format!("rs-{}", i))),
            name: sanitize_name(row.name.unwrap_or_else(|| "Unknown".to_string())),
            kind: RenewableKind::from_label(row.kind.as_deref().unwrap_or_default()),
            location,
            capacity_mw,
        });
    }

    info!(
        "Loaded {} renewable sources ({} skipped)",
        sources.len(),
        skipped
    );

    Ok(sources)
}

/// Load demand centers from JSON file
pub fn load_demand_centers(path: impl AsRef<Path>) -> Result<Vec<DemandCenter>> {
    let path = path.as_ref();
    info!("Loading demand centers from {:?}", path);

    let rows = read_rows(path, "demand_centers")?;

    let mut centers = Vec::new();
    let mut skipped = 0;

    for (i, value) in rows.into_iter().enumerate() {
        let row: RawDemandCenter = match serde_json::from_value(value) {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping demand center #{}: {}", i, e);
                skipped += 1;
                continue;
            }
        };

        let location = match parse_location(row.latitude.as_ref(), row.longitude.as_ref()) {
            Some(Ok(c)) => c,
            Some(Err(e)) => {
                warn!("Skipping demand center #{}: {}", i, e);
                skipped += 1;
                continue;
            }
            None => {
                warn!("Skipping demand center #{}: missing coordinates", i);
                skipped += 1;
                continue;
            }
        };

        let level = match row.demand_level.as_deref().map(DemandLevel::from_label) {
            Some(Ok(level)) => level,
            Some(Err(e)) => {
                warn!("Skipping demand center #{}: {}", i, e);
                skipped += 1;
                continue;
            }
            None => {
                warn!("Skipping demand center #{}: missing demand level", i);
                skipped += 1;
                continue;
            }
        };

        centers.push(DemandCenter {
            id: sanitize_id(row.id.unwrap_or_else(|| format!("dc-{}", i))),
            name: sanitize_name(row.name.unwrap_or_else(|| "Unknown".to_string())),
            sector: sanitize_name(row.sector.unwrap_or_else(|| "Unknown".to_string())),
            location,
            level,
        });
    }

    info!(
        "Loaded {} demand centers ({} skipped)",
        centers.len(),
        skipped
    );

    Ok(centers)
}

/// Load both halves of the catalog
pub fn load_catalog(
    renewables_path: impl AsRef<Path>,
    demand_path: impl AsRef<Path>,
) -> Result<InfrastructureCatalog> {
    let catalog = InfrastructureCatalog {
        renewables: load_renewable_sources(renewables_path)?,
        demand_centers: load_demand_centers(demand_path)?,
    };

    info!(
        "Catalog ready: {} renewable sources, {} demand centers",
        catalog.renewables.len(),
        catalog.demand_centers.len()
    );

    Ok(catalog)
}

//! Proximity filter: catalog → distance-annotated scoring inputs

use crate::loader::{DemandCenter, InfrastructureCatalog, RenewableSource};
use crate::{
    distance_km, Coordinate, DemandSignal, RenewableSignal, DEMAND_RADIUS_KM,
    MAX_NEARBY_SIGNALS, RENEWABLE_RADIUS_KM,
};
use serde::{Deserialize, Serialize};

/// Search radii and per-kind limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityRadii {
    pub renewable_km: f64,
    pub demand_km: f64,
    pub max_per_kind: usize,
}

impl Default for ProximityRadii {
    fn default() -> Self {
        Self {
            renewable_km: RENEWABLE_RADIUS_KM,
            demand_km: DEMAND_RADIUS_KM,
            max_per_kind: MAX_NEARBY_SIGNALS,
        }
    }
}

/// Catalog entry paired with its distance to the candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nearby<T> {
    #[serde(flatten)]
    pub entry: T,
    pub distance_km: f64,
}

/// What lies within range of one candidate, nearest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyInfrastructure {
    pub renewables: Vec<Nearby<RenewableSource>>,
    pub demand: Vec<Nearby<DemandCenter>>,
}

impl NearbyInfrastructure {
    pub fn renewable_signals(&self) -> Vec<RenewableSignal> {
        self.renewables
            .iter()
            .map(|n| RenewableSignal::new(n.entry.kind, n.distance_km, n.entry.capacity_mw))
            .collect()
    }

    pub fn demand_signals(&self) -> Vec<DemandSignal> {
        self.demand
            .iter()
            .map(|n| DemandSignal::new(n.entry.sector.clone(), n.distance_km, n.entry.level))
            .collect()
    }
}

fn within<'a, T: Clone + 'a>(
    entries: impl Iterator<Item = (&'a T, &'a Coordinate)>,
    candidate: &Coordinate,
    radius_km: f64,
    limit: usize,
) -> Vec<Nearby<T>> {
    let mut hits: Vec<Nearby<T>> = entries
        .map(|(entry, location)| Nearby {
            entry: entry.clone(),
            distance_km: distance_km(candidate, location),
        })
        .filter(|n| n.distance_km < radius_km)
        .collect();

    // Stable, so equidistant entries keep catalog order
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits.truncate(limit);
    hits
}

/// Annotate catalog entries with their distance and keep the nearest in range
pub fn nearby_infrastructure(
    catalog: &InfrastructureCatalog,
    candidate: &Coordinate,
    radii: &ProximityRadii,
) -> NearbyInfrastructure {
    NearbyInfrastructure {
        renewables: within(
            catalog.renewables.iter().map(|r| (r, &r.location)),
            candidate,
            radii.renewable_km,
            radii.max_per_kind,
        ),
        demand: within(
            catalog.demand_centers.iter().map(|d| (d, &d.location)),
            candidate,
            radii.demand_km,
            radii.max_per_kind,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DemandLevel, RenewableKind};

    fn source(id: &str, lat: f64, lon: f64) -> RenewableSource {
        RenewableSource {
            id: id.to_string(),
            name: id.to_string(),
            kind: RenewableKind::Wind,
            location: Coordinate::new(lat, lon).unwrap(),
            capacity_mw: 200.0,
        }
    }

    fn center(id: &str, lat: f64, lon: f64) -> DemandCenter {
        DemandCenter {
            id: id.to_string(),
            name: id.to_string(),
            sector: "Port".to_string(),
            location: Coordinate::new(lat, lon).unwrap(),
            level: DemandLevel::Medium,
        }
    }

    #[test]
    fn test_radius_and_order() {
        let candidate = Coordinate::new(23.0, 72.5).unwrap();
        // One degree of latitude is ~111 km
        let catalog = InfrastructureCatalog {
            renewables: vec![
                source("far", 23.8, 72.5),
                source("near", 23.1, 72.5),
                source("out", 24.0, 72.5),
            ],
            demand_centers: vec![center("d-near", 23.5, 72.5), center("d-out", 24.5, 72.5)],
        };

        let nearby = nearby_infrastructure(&catalog, &candidate, &ProximityRadii::default());

        let ids: Vec<_> = nearby.renewables.iter().map(|n| n.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far"]);
        assert!(nearby.renewables[0].distance_km < nearby.renewables[1].distance_km);

        assert_eq!(nearby.demand.len(), 1);
        assert_eq!(nearby.demand[0].entry.id, "d-near");
    }

    #[test]
    fn test_limit_keeps_nearest() {
        let candidate = Coordinate::new(0.0, 0.0).unwrap();
        let catalog = InfrastructureCatalog {
            renewables: (0..8)
                .rev()
                .map(|i| source(&format!("r{}", i), 0.0, 0.05 * i as f64))
                .collect(),
            demand_centers: vec![],
        };

        let nearby = nearby_infrastructure(&catalog, &candidate, &ProximityRadii::default());
        let ids: Vec<_> = nearby.renewables.iter().map(|n| n.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["r0", "r1", "r2", "r3", "r4"]);
    }

    #[test]
    fn test_signals_carry_distance() {
        let candidate = Coordinate::new(23.0, 72.5).unwrap();
        let catalog = InfrastructureCatalog {
            renewables: vec![source("a", 23.0, 72.5)],
            demand_centers: vec![center("b", 23.1, 72.5)],
        };

        let nearby = nearby_infrastructure(&catalog, &candidate, &ProximityRadii::default());
        let renewables = nearby.renewable_signals();
        let demand = nearby.demand_signals();

        assert_eq!(renewables[0].distance_km, 0.0);
        assert_eq!(renewables[0].capacity_mw, 200.0);
        assert!((demand[0].distance_km - 11.1).abs() < 0.5);
        assert_eq!(demand[0].sector, "Port");
    }

    #[test]
    fn test_empty_catalog() {
        let candidate = Coordinate::new(51.5, -0.1).unwrap();
        let nearby = nearby_infrastructure(
            &InfrastructureCatalog::default(),
            &candidate,
            &ProximityRadii::default(),
        );
        assert_eq!(nearby, NearbyInfrastructure::default());
    }
}

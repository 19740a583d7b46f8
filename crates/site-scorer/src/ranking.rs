//! Batch analysis and ranking of named candidate sites

use crate::jitter::JitterSource;
use crate::loader::InfrastructureCatalog;
use crate::proximity::{nearby_infrastructure, ProximityRadii};
use crate::region::RegionPotentialProvider;
use crate::scorer::SiteScorer;
use crate::{Coordinate, DecimalValue, Result, SiteAnalysis, SitingError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// A site proposed for analysis
///
/// Wire shape is flat: `{"id", "name", "latitude", "longitude"}`. Coordinates
/// may be numbers or decimal strings and are validated on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCandidateSite")]
pub struct CandidateSite {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub location: Coordinate,
}

#[derive(Deserialize)]
struct RawCandidateSite {
    id: String,
    #[serde(default)]
    name: String,
    latitude: DecimalValue,
    longitude: DecimalValue,
}

impl TryFrom<RawCandidateSite> for CandidateSite {
    type Error = SitingError;

    fn try_from(raw: RawCandidateSite) -> Result<Self> {
        Ok(Self {
            location: Coordinate::from_values(&raw.latitude, &raw.longitude)?,
            id: raw.id,
            name: raw.name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSite {
    /// 1-based position after sorting
    pub rank: usize,
    pub site: CandidateSite,
    pub analysis: SiteAnalysis,
    /// Ids of the renewable sources that fed the score
    pub nearby_renewables: Vec<String>,
    /// Ids of the demand centers that fed the score
    pub nearby_demand: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingMetadata {
    pub total_sites: usize,
    pub renewable_radius_km: f64,
    pub demand_radius_km: f64,
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub ranked: Vec<RankedSite>,
    pub metadata: RankingMetadata,
}

/// Load candidate sites from a JSON array (or `{"sites": [...]}`)
pub fn load_candidate_sites(path: impl AsRef<Path>) -> Result<Vec<CandidateSite>> {
    let path = path.as_ref();
    info!("Loading candidate sites from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: serde_json::Value = serde_json::from_reader(reader)?;

    let sites: Vec<CandidateSite> = match raw.get("sites") {
        Some(sites) => serde_json::from_value(sites.clone())?,
        None => serde_json::from_value(raw)?,
    };

    info!("Loaded {} candidate sites", sites.len());
    Ok(sites)
}

/// Analyze every site against the catalog and order best first
///
/// Ties on score are broken by id so output is stable. The first site with
/// an invalid coordinate aborts the batch.
pub fn rank_sites<P: RegionPotentialProvider>(
    catalog: &InfrastructureCatalog,
    sites: &[CandidateSite],
    scorer: &SiteScorer<P>,
    radii: &ProximityRadii,
    jitter: &mut dyn JitterSource,
) -> Result<RankingResult> {
    info!("Ranking {} candidate sites", sites.len());

    let mut ranked = Vec::with_capacity(sites.len());

    for site in sites {
        site.location.validate()?;

        let nearby = nearby_infrastructure(catalog, &site.location, radii);
        let analysis = scorer.analyze(
            &site.location,
            &nearby.renewable_signals(),
            &nearby.demand_signals(),
            jitter,
        )?;

        debug!(
            "Site {} scored {} ({} renewables, {} demand centers in range)",
            site.id,
            analysis.suitability_score,
            nearby.renewables.len(),
            nearby.demand.len()
        );

        ranked.push(RankedSite {
            rank: 0,
            site: site.clone(),
            analysis,
            nearby_renewables: nearby.renewables.iter().map(|n| n.entry.id.clone()).collect(),
            nearby_demand: nearby.demand.iter().map(|n| n.entry.id.clone()).collect(),
        });
    }

    ranked.sort_by(|a, b| {
        b.analysis
            .suitability_score
            .cmp(&a.analysis.suitability_score)
            .then_with(|| a.site.id.cmp(&b.site.id))
    });
    for (i, r) in ranked.iter_mut().enumerate() {
        r.rank = i + 1;
    }

    let metadata = RankingMetadata {
        total_sites: ranked.len(),
        renewable_radius_km: radii.renewable_km,
        demand_radius_km: radii.demand_km,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    if let Some(best) = ranked.first() {
        info!(
            "Best site: {} ({}) with score {}",
            best.site.name, best.site.id, best.analysis.suitability_score
        );
    }

    Ok(RankingResult { ranked, metadata })
}

/// Export a ranking as a GeoJSON FeatureCollection
pub fn to_geojson(result: &RankingResult) -> serde_json::Value {
    let features: Vec<serde_json::Value> = result
        .ranked
        .iter()
        .map(|r| {
            serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.site.location.longitude, r.site.location.latitude]
                },
                "properties": {
                    "id": r.site.id,
                    "name": r.site.name,
                    "rank": r.rank,
                    "suitability_score": r.analysis.suitability_score,
                    "renewable_access": r.analysis.factors.renewable_access,
                    "transport_cost": r.analysis.factors.transport_cost,
                    "demand_proximity": r.analysis.factors.demand_proximity,
                    "water_availability": r.analysis.factors.water_availability,
                    "regulatory_support": r.analysis.factors.regulatory_support,
                    "co2_saved_annually": r.analysis.co2_saved_annually,
                    "industries_supported": r.analysis.industries_supported,
                    "renewable_utilization": r.analysis.renewable_utilization,
                    "nearby_renewables": r.nearby_renewables.len(),
                    "nearby_demand": r.nearby_demand.len()
                }
            })
        })
        .collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features,
        "metadata": result.metadata
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::NoJitter;
    use crate::loader::{DemandCenter, RenewableSource};
    use crate::{DemandLevel, RenewableKind, SitingError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn site(id: &str, lat: f64, lon: f64) -> CandidateSite {
        CandidateSite {
            id: id.to_string(),
            name: id.to_uppercase(),
            location: Coordinate {
                latitude: lat,
                longitude: lon,
            },
        }
    }

    fn gujarat_catalog() -> InfrastructureCatalog {
        InfrastructureCatalog {
            renewables: vec![RenewableSource {
                id: "rs-gujarat-wind".to_string(),
                name: "Gujarat Wind Energy Park".to_string(),
                kind: RenewableKind::Wind,
                location: Coordinate::new(23.0225, 72.5714).unwrap(),
                capacity_mw: 420.0,
            }],
            demand_centers: vec![DemandCenter {
                id: "dc-iocl-vadodara".to_string(),
                name: "Indian Oil Vadodara Refinery".to_string(),
                sector: "Refinery".to_string(),
                location: Coordinate::new(22.3072, 73.1812).unwrap(),
                level: DemandLevel::High,
            }],
        }
    }

    #[test]
    fn test_rank_sites_sorted() {
        let catalog = gujarat_catalog();
        let sites = vec![
            site("london", 51.5074, -0.1278),
            site("ahmedabad", 23.03, 72.58),
            site("jaisalmer", 26.9157, 70.9083),
        ];

        let result = rank_sites(
            &catalog,
            &sites,
            &SiteScorer::default(),
            &ProximityRadii::default(),
            &mut NoJitter,
        )
        .unwrap();

        assert_eq!(result.metadata.total_sites, 3);
        assert_eq!(result.ranked[0].site.id, "ahmedabad");
        assert_eq!(result.ranked[0].rank, 1);
        assert_eq!(result.ranked[0].nearby_renewables, vec!["rs-gujarat-wind"]);
        assert_eq!(result.ranked[0].nearby_demand, vec!["dc-iocl-vadodara"]);
        assert_eq!(result.ranked[2].site.id, "london");
        assert_eq!(result.ranked[2].analysis.suitability_score, 20);

        let scores: Vec<u8> = result
            .ranked
            .iter()
            .map(|r| r.analysis.suitability_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let sites = vec![
            site("b", 51.5, -0.1),
            site("a", 48.8, 2.3),
            site("c", 52.5, 13.4),
        ];
        let result = rank_sites(
            &InfrastructureCatalog::default(),
            &sites,
            &SiteScorer::default(),
            &ProximityRadii::default(),
            &mut NoJitter,
        )
        .unwrap();

        let ids: Vec<_> = result.ranked.iter().map(|r| r.site.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_site_aborts() {
        let sites = vec![site("ok", 23.0, 72.5), site("bad", 200.0, 72.5)];
        let err = rank_sites(
            &gujarat_catalog(),
            &sites,
            &SiteScorer::default(),
            &ProximityRadii::default(),
            &mut NoJitter,
        )
        .unwrap_err();
        assert!(matches!(err, SitingError::InvalidLatitude(_)));
    }

    #[test]
    fn test_geojson_export() {
        let result = rank_sites(
            &gujarat_catalog(),
            &[site("ahmedabad", 23.03, 72.58)],
            &SiteScorer::default(),
            &ProximityRadii::default(),
            &mut NoJitter,
        )
        .unwrap();

        let geojson = to_geojson(&result);
        assert_eq!(geojson["type"], "FeatureCollection");
        let feature = &geojson["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], 72.58);
        assert_eq!(feature["properties"]["rank"], 1);
        assert_eq!(feature["properties"]["water_availability"], "Excellent");
        assert_eq!(geojson["metadata"]["total_sites"], 1);
    }

    #[test]
    fn test_load_candidate_sites() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"sites": [{"id": "kutch", "name": "Kutch", "latitude": 23.7337, "longitude": 69.8597}, {"id": "noname", "latitude": 10.0, "longitude": 76.0}]}"#,
        )
        .unwrap();

        let sites = load_candidate_sites(file.path()).unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].location.longitude, 69.8597);
        assert_eq!(sites[1].name, "");
    }

    #[test]
    fn test_candidate_site_coordinates() {
        let site: CandidateSite = serde_json::from_str(
            r#"{"id": "kandla", "name": "Kandla", "latitude": "21.0376", "longitude": 70.2174}"#,
        )
        .unwrap();
        assert_eq!(site.location.latitude, 21.0376);
        assert_eq!(site.location.longitude, 70.2174);

        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["latitude"], 21.0376);

        for bad in [
            r#"{"id": "x", "latitude": "north", "longitude": 70.0}"#,
            r#"{"id": "x", "latitude": 95.0, "longitude": 70.0}"#,
            r#"{"id": "x", "latitude": true, "longitude": 70.0}"#,
            r#"{"id": "x", "longitude": 70.0}"#,
        ] {
            assert!(serde_json::from_str::<CandidateSite>(bad).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_rank_shipped_sites() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let catalog = crate::loader::load_catalog(
            root.join("renewable_sources.json"),
            root.join("demand_centers.json"),
        )
        .unwrap();
        let sites = load_candidate_sites(root.join("candidate_sites.json")).unwrap();

        let result = rank_sites(
            &catalog,
            &sites,
            &SiteScorer::default(),
            &ProximityRadii::default(),
            &mut NoJitter,
        )
        .unwrap();

        assert_eq!(result.ranked.len(), 10);
        assert!(result
            .ranked
            .iter()
            .all(|r| (20..=100).contains(&r.analysis.suitability_score)));
        // The Vadodara corridor sits on top of a refinery and a chemical complex
        assert!(result.ranked[0].analysis.suitability_score > result.ranked[9].analysis.suitability_score);
    }
}

//! Derived impact metrics, factor ratings and recommendations

use crate::jitter::JitterSource;
use crate::region::RegionProfile;
use crate::scorer::{Contributions, ScoringPolicy};
use crate::{
    Coordinate, DemandLevel, DemandProximity, DemandSignal, RegulatorySupport, RenewableSignal,
    TransportCost, WaterAvailability,
};

pub const DEFAULT_RECOMMENDATION: &str =
    "Site shows good potential for hydrogen infrastructure development";

const RENEWABLE_PARTNERSHIP: &str =
    "Consider establishing renewable energy partnerships or grid connections";
const DEMAND_OUTREACH: &str =
    "Identify and develop relationships with potential industrial customers";
const INDUSTRIAL_OFFTAKE: &str =
    "Co-locate with nearby heavy industry to secure hydrogen offtake close to the plant";
const COASTAL_EXPORT: &str = "Leverage coastal location for hydrogen export opportunities";
const MAXIMIZE_UTILIZATION: &str = "Maximize utilization of abundant renewable energy sources";

/// Average demand distance used when nothing is in range
const NO_DEMAND_DISTANCE_KM: f64 = 100.0;

/// Average distance to demand → transport cost
pub fn transport_cost(demand: &[DemandSignal]) -> TransportCost {
    let avg = if demand.is_empty() {
        NO_DEMAND_DISTANCE_KM
    } else {
        demand.iter().map(|d| d.distance_km).sum::<f64>() / demand.len() as f64
    };

    if avg < 50.0 {
        TransportCost::Low
    } else if avg < 100.0 {
        TransportCost::Medium
    } else {
        TransportCost::High
    }
}

/// Demand contribution (D) → qualitative rating
pub fn demand_proximity(demand_contribution: f64) -> DemandProximity {
    if demand_contribution > 70.0 {
        DemandProximity::Excellent
    } else if demand_contribution > 50.0 {
        DemandProximity::Good
    } else if demand_contribution > 30.0 {
        DemandProximity::Fair
    } else {
        DemandProximity::Limited
    }
}

/// Coastal sites get seawater access; otherwise wetter low latitudes rate higher
pub fn water_availability(candidate: &Coordinate, profile: &RegionProfile) -> WaterAvailability {
    let abs_lat = candidate.latitude.abs();
    if profile.coastal {
        WaterAvailability::Excellent
    } else if abs_lat < 15.0 {
        WaterAvailability::VeryGood
    } else if abs_lat < 30.0 {
        WaterAvailability::Good
    } else {
        WaterAvailability::Moderate
    }
}

pub fn regulatory_support(heavy_industry_nearby: bool, profile: &RegionProfile) -> RegulatorySupport {
    if heavy_industry_nearby || profile.strong_policy_support {
        RegulatorySupport::Strong
    } else {
        RegulatorySupport::Moderate
    }
}

/// Annual CO₂ avoided (tons) for a final score and nearby capacity
pub fn co2_saved_annually(
    policy: &ScoringPolicy,
    score: u8,
    total_capacity_mw: f64,
    jitter: &mut dyn JitterSource,
) -> u32 {
    let tons = policy.co2_base_tons
        + f64::from(score) * policy.co2_tons_per_score_point
        + total_capacity_mw * policy.co2_tons_per_mw
        + jitter.sample(policy.co2_jitter_tons);

    tons.round().max(0.0) as u32
}

/// Industries a plant here could supply, weighted by demand level
pub fn industries_supported(policy: &ScoringPolicy, demand: &[DemandSignal]) -> u32 {
    let weighted: u32 = demand
        .iter()
        .map(|d| match d.level {
            DemandLevel::High => 3,
            DemandLevel::Medium => 2,
            DemandLevel::Low => 1,
        })
        .sum();

    weighted
        .max(policy.industries_baseline)
        .min(policy.industries_cap)
}

/// Expected share of nearby renewable output usable for electrolysis (%)
pub fn renewable_utilization(
    policy: &ScoringPolicy,
    renewables: &[RenewableSignal],
    jitter: &mut dyn JitterSource,
) -> u8 {
    let base = if renewables.is_empty() {
        policy.utilization_baseline_pct
    } else {
        let capacity: f64 = renewables.iter().map(|r| r.capacity_mw).sum();
        (policy.utilization_with_renewables_pct + capacity / policy.utilization_mw_per_point)
            .min(policy.utilization_cap_pct)
    };

    let pct = (base + jitter.sample(policy.utilization_jitter_pct)).min(policy.utilization_cap_pct);
    pct.round().clamp(0.0, 100.0) as u8
}

/// Ordered, non-empty advice list
///
/// The weak-contribution advice only applies when signals of that kind exist;
/// an empty context falls through to the default.
pub fn recommendations(
    policy: &ScoringPolicy,
    c: &Contributions,
    has_renewables: bool,
    has_demand: bool,
) -> Vec<String> {
    let rules = [
        (
            has_renewables && c.renewable < policy.weak_contribution_threshold,
            RENEWABLE_PARTNERSHIP,
        ),
        (
            has_demand && c.demand < policy.weak_contribution_threshold,
            DEMAND_OUTREACH,
        ),
        (c.heavy_industry_nearby, INDUSTRIAL_OFFTAKE),
        (c.profile.coastal, COASTAL_EXPORT),
        (
            c.total_capacity_mw >= policy.abundant_capacity_mw,
            MAXIMIZE_UTILIZATION,
        ),
    ];

    let mut out: Vec<String> = rules
        .iter()
        .filter(|(fires, _)| *fires)
        .map(|(_, text)| text.to_string())
        .collect();

    if out.is_empty() {
        out.push(DEFAULT_RECOMMENDATION.to_string());
    }
    out
}

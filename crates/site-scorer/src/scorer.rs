//! Site suitability scoring
//!
//! Implements the weighted contribution model:
//! Score(site) = clamp(w_R·R + w_D·D + B_region + B_industry, floor, ceiling)
//!
//! - R: renewable access, linear distance decay averaged over nearby sources
//!   plus a band bonus for aggregate capacity
//! - D: demand proximity, linear distance decay scaled by demand level,
//!   averaged, plus a bonus per distinct industry sector
//! - B_region: geography bonus from the region potential provider
//! - B_industry: flat bonus when heavy industry is within range

use crate::jitter::{JitterSource, NoJitter};
use crate::metrics;
use crate::region::{RegionPotential, RegionPotentialProvider, RegionProfile, RegionTable};
use crate::{
    Coordinate, DemandLevel, DemandSignal, RenewableSignal, Result, SiteAnalysis, SiteFactors,
    SitingError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Contribution weights (9 decimal precision)
pub const W_RENEWABLE: f64 = 0.400000000;
pub const W_DEMAND: f64 = 0.400000000;

/// Score bounds
pub const SCORE_FLOOR: f64 = 20.000000000;
pub const SCORE_CEILING: f64 = 100.000000000;

/// Points lost per km of distance (9 decimal precision)
const RENEWABLE_DECAY_PER_KM: f64 = 2.000000000;
const DEMAND_DECAY_PER_KM: f64 = 1.500000000;

/// Contribution used when no signal of that kind is in range
const RENEWABLE_BASELINE: f64 = 20.000000000;
const DEMAND_BASELINE: f64 = 25.000000000;

/// Scoring policy
///
/// Every constant of the model lives here so a deployment can tune it from a
/// JSON file without recompiling. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Lowest score any valid coordinate receives
    pub score_floor: f64,
    pub score_ceiling: f64,
    /// Weight for renewable access (R)
    pub w_renewable: f64,
    /// Weight for demand proximity (D)
    pub w_demand: f64,
    pub renewable_decay_per_km: f64,
    pub demand_decay_per_km: f64,
    pub renewable_baseline: f64,
    pub demand_baseline: f64,
    /// (aggregate MW threshold, bonus) pairs; the first exceeded threshold applies
    pub capacity_bands: Vec<(f64, f64)>,
    pub high_demand_multiplier: f64,
    pub medium_demand_multiplier: f64,
    pub low_demand_multiplier: f64,
    /// Bonus per distinct demand sector in range
    pub sector_diversity_bonus: f64,
    pub high_potential_bonus: f64,
    pub coastal_bonus: f64,
    pub standard_region_bonus: f64,
    pub heavy_industry_bonus: f64,

    // Derived metrics
    pub co2_base_tons: f64,
    pub co2_tons_per_score_point: f64,
    pub co2_tons_per_mw: f64,
    pub co2_jitter_tons: f64,
    pub utilization_baseline_pct: f64,
    pub utilization_with_renewables_pct: f64,
    /// Aggregate MW that adds one utilization point
    pub utilization_mw_per_point: f64,
    pub utilization_cap_pct: f64,
    pub utilization_jitter_pct: f64,
    pub industries_baseline: u32,
    pub industries_cap: u32,
    /// Aggregate MW at which utilization advice is given
    pub abundant_capacity_mw: f64,
    /// Contributions below this trigger partnership / customer advice
    pub weak_contribution_threshold: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            score_floor: SCORE_FLOOR,
            score_ceiling: SCORE_CEILING,
            w_renewable: W_RENEWABLE,
            w_demand: W_DEMAND,
            renewable_decay_per_km: RENEWABLE_DECAY_PER_KM,
            demand_decay_per_km: DEMAND_DECAY_PER_KM,
            renewable_baseline: RENEWABLE_BASELINE,
            demand_baseline: DEMAND_BASELINE,
            capacity_bands: vec![(1000.0, 15.0), (500.0, 10.0), (250.0, 5.0)],
            high_demand_multiplier: 1.5,
            medium_demand_multiplier: 1.2,
            low_demand_multiplier: 1.0,
            sector_diversity_bonus: 2.0,
            high_potential_bonus: 15.0,
            coastal_bonus: 10.0,
            standard_region_bonus: 0.0,
            heavy_industry_bonus: 15.0,
            co2_base_tons: 15_000.0,
            co2_tons_per_score_point: 2_000.0,
            co2_tons_per_mw: 100.0,
            co2_jitter_tons: 5_000.0,
            utilization_baseline_pct: 25.0,
            utilization_with_renewables_pct: 40.0,
            utilization_mw_per_point: 50.0,
            utilization_cap_pct: 95.0,
            utilization_jitter_pct: 5.0,
            industries_baseline: 2,
            industries_cap: 20,
            abundant_capacity_mw: 400.0,
            weak_contribution_threshold: 40.0,
        }
    }
}

impl ScoringPolicy {
    /// Load a policy override from JSON
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading scoring policy from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let policy: Self = serde_json::from_reader(reader)?;
        policy.validate()?;

        Ok(policy)
    }

    /// Reject policies that would break the score bounds or invert the
    /// distance and capacity orderings
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("score_floor", self.score_floor),
            ("w_renewable", self.w_renewable),
            ("w_demand", self.w_demand),
            ("renewable_decay_per_km", self.renewable_decay_per_km),
            ("demand_decay_per_km", self.demand_decay_per_km),
            ("renewable_baseline", self.renewable_baseline),
            ("demand_baseline", self.demand_baseline),
            ("high_demand_multiplier", self.high_demand_multiplier),
            ("medium_demand_multiplier", self.medium_demand_multiplier),
            ("low_demand_multiplier", self.low_demand_multiplier),
            ("sector_diversity_bonus", self.sector_diversity_bonus),
            ("high_potential_bonus", self.high_potential_bonus),
            ("coastal_bonus", self.coastal_bonus),
            ("standard_region_bonus", self.standard_region_bonus),
            ("heavy_industry_bonus", self.heavy_industry_bonus),
            ("co2_base_tons", self.co2_base_tons),
            ("co2_tons_per_score_point", self.co2_tons_per_score_point),
            ("co2_tons_per_mw", self.co2_tons_per_mw),
            ("co2_jitter_tons", self.co2_jitter_tons),
            ("utilization_baseline_pct", self.utilization_baseline_pct),
            ("utilization_with_renewables_pct", self.utilization_with_renewables_pct),
            ("utilization_cap_pct", self.utilization_cap_pct),
            ("utilization_jitter_pct", self.utilization_jitter_pct),
            ("abundant_capacity_mw", self.abundant_capacity_mw),
            ("weak_contribution_threshold", self.weak_contribution_threshold),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(policy_error(format!(
                    "{} must be a finite value >= 0, got {}",
                    field, value
                )));
            }
        }

        for (threshold, bonus) in &self.capacity_bands {
            if !(threshold.is_finite() && bonus.is_finite() && *bonus >= 0.0) {
                return Err(policy_error(format!(
                    "capacity band ({}, {}) must be finite with a bonus >= 0",
                    threshold, bonus
                )));
            }
        }

        if !(self.utilization_mw_per_point.is_finite() && self.utilization_mw_per_point > 0.0) {
            return Err(policy_error(format!(
                "utilization_mw_per_point must be > 0, got {}",
                self.utilization_mw_per_point
            )));
        }
        if !(self.score_ceiling.is_finite() && self.score_ceiling <= 100.0) {
            return Err(policy_error(format!(
                "score_ceiling must be <= 100, got {}",
                self.score_ceiling
            )));
        }
        if self.score_floor > self.score_ceiling {
            return Err(policy_error(format!(
                "score_floor {} exceeds score_ceiling {}",
                self.score_floor, self.score_ceiling
            )));
        }
        if self.industries_baseline > self.industries_cap {
            return Err(policy_error(format!(
                "industries_baseline {} exceeds industries_cap {}",
                self.industries_baseline, self.industries_cap
            )));
        }

        Ok(())
    }

    pub fn demand_multiplier(&self, level: DemandLevel) -> f64 {
        match level {
            DemandLevel::High => self.high_demand_multiplier,
            DemandLevel::Medium => self.medium_demand_multiplier,
            DemandLevel::Low => self.low_demand_multiplier,
        }
    }

    /// Bonus for aggregate nearby renewable capacity
    pub fn capacity_bonus(&self, total_capacity_mw: f64) -> f64 {
        self.capacity_bands
            .iter()
            .find(|(threshold, _)| total_capacity_mw > *threshold)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0.0)
    }

    pub fn region_bonus(&self, potential: RegionPotential) -> f64 {
        match potential {
            RegionPotential::High => self.high_potential_bonus,
            RegionPotential::Coastal => self.coastal_bonus,
            RegionPotential::Standard => self.standard_region_bonus,
        }
    }
}

fn policy_error(message: String) -> SitingError {
    SitingError::InvalidPolicy(message)
}

/// Intermediate terms of one scoring run
#[derive(Debug, Clone, PartialEq)]
pub struct Contributions {
    /// R (0-100)
    pub renewable: f64,
    /// D (0-100)
    pub demand: f64,
    pub region_bonus: f64,
    pub industry_bonus: f64,
    pub total_capacity_mw: f64,
    pub heavy_industry_nearby: bool,
    pub profile: RegionProfile,
}

impl Contributions {
    /// Weighted sum before clamping
    pub fn raw_score(&self, policy: &ScoringPolicy) -> f64 {
        policy.w_renewable * self.renewable
            + policy.w_demand * self.demand
            + self.region_bonus
            + self.industry_bonus
    }
}

/// Distance decay score of one renewable source (0-100)
pub fn renewable_decay(policy: &ScoringPolicy, signal: &RenewableSignal) -> f64 {
    (100.0 - signal.distance_km * policy.renewable_decay_per_km).max(0.0)
}

/// Level-weighted distance decay score of one demand center
pub fn demand_decay(policy: &ScoringPolicy, signal: &DemandSignal) -> f64 {
    (100.0 - signal.distance_km * policy.demand_decay_per_km).max(0.0)
        * policy.demand_multiplier(signal.level)
}

/// R: average decay plus capacity band, capped at 100
pub fn renewable_contribution(policy: &ScoringPolicy, renewables: &[RenewableSignal]) -> f64 {
    if renewables.is_empty() {
        return policy.renewable_baseline;
    }

    let mean_decay = renewables
        .iter()
        .map(|r| renewable_decay(policy, r))
        .sum::<f64>()
        / renewables.len() as f64;
    let bonus = policy.capacity_bonus(total_capacity_mw(renewables));

    (mean_decay + bonus).min(100.0)
}

/// D: average level-weighted decay plus sector diversity, capped at 100
pub fn demand_contribution(policy: &ScoringPolicy, demand: &[DemandSignal]) -> f64 {
    if demand.is_empty() {
        return policy.demand_baseline;
    }

    let mean_decay =
        demand.iter().map(|d| demand_decay(policy, d)).sum::<f64>() / demand.len() as f64;

    let sectors: HashSet<String> = demand
        .iter()
        .map(|d| d.sector.trim().to_lowercase())
        .collect();
    let diversity = sectors.len() as f64 * policy.sector_diversity_bonus;

    (mean_decay + diversity).min(100.0)
}

pub fn total_capacity_mw(renewables: &[RenewableSignal]) -> f64 {
    renewables.iter().map(|r| r.capacity_mw).sum()
}

/// Scorer with an injected region potential provider
#[derive(Debug, Clone)]
pub struct SiteScorer<P = RegionTable> {
    policy: ScoringPolicy,
    regions: P,
}

impl Default for SiteScorer<RegionTable> {
    fn default() -> Self {
        Self::new(ScoringPolicy::default())
    }
}

impl SiteScorer<RegionTable> {
    /// Scorer using the built-in India region table
    pub fn new(policy: ScoringPolicy) -> Self {
        Self::with_regions(policy, RegionTable::india())
    }
}

impl<P: RegionPotentialProvider> SiteScorer<P> {
    pub fn with_regions(policy: ScoringPolicy, regions: P) -> Self {
        Self { policy, regions }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn regions(&self) -> &P {
        &self.regions
    }

    /// Compute R, D and the bonuses after validating every input
    pub fn contributions(
        &self,
        candidate: &Coordinate,
        renewables: &[RenewableSignal],
        demand: &[DemandSignal],
    ) -> Result<Contributions> {
        candidate.validate()?;
        for r in renewables {
            r.validate()?;
        }
        for d in demand {
            d.validate()?;
        }

        let profile = self.regions.profile(candidate);
        let heavy_industry_nearby = demand.iter().any(DemandSignal::is_heavy_industry);

        Ok(Contributions {
            renewable: renewable_contribution(&self.policy, renewables),
            demand: demand_contribution(&self.policy, demand),
            region_bonus: self.policy.region_bonus(profile.potential),
            industry_bonus: if heavy_industry_nearby {
                self.policy.heavy_industry_bonus
            } else {
                0.0
            },
            total_capacity_mw: total_capacity_mw(renewables),
            heavy_industry_nearby,
            profile,
        })
    }

    /// Score a candidate against its nearby signals
    ///
    /// Inputs are trusted to be pre-filtered to the proximity radii; they are
    /// only checked for range validity. Empty lists are valid.
    pub fn analyze(
        &self,
        candidate: &Coordinate,
        renewables: &[RenewableSignal],
        demand: &[DemandSignal],
        jitter: &mut dyn JitterSource,
    ) -> Result<SiteAnalysis> {
        let c = self.contributions(candidate, renewables, demand)?;
        let policy = &self.policy;

        let score = c
            .raw_score(policy)
            .max(policy.score_floor)
            .min(policy.score_ceiling)
            .round()
            .clamp(0.0, 100.0) as u8;

        debug!(
            "Scored {}: {} (renew={:.1}, demand={:.1}, region={:.0}, industry={:.0}, mw={:.0})",
            candidate, score, c.renewable, c.demand, c.region_bonus, c.industry_bonus, c.total_capacity_mw
        );

        let factors = SiteFactors {
            renewable_access: c.renewable.round().clamp(0.0, 100.0) as u8,
            transport_cost: metrics::transport_cost(demand),
            demand_proximity: metrics::demand_proximity(c.demand),
            water_availability: metrics::water_availability(candidate, &c.profile),
            regulatory_support: metrics::regulatory_support(c.heavy_industry_nearby, &c.profile),
        };

        Ok(SiteAnalysis {
            suitability_score: score,
            factors,
            recommendations: metrics::recommendations(
                policy,
                &c,
                !renewables.is_empty(),
                !demand.is_empty(),
            ),
            co2_saved_annually: metrics::co2_saved_annually(
                policy,
                score,
                c.total_capacity_mw,
                jitter,
            ),
            industries_supported: metrics::industries_supported(policy, demand),
            renewable_utilization: metrics::renewable_utilization(
                policy,
                renewables,
                jitter,
            ),
        })
    }
}

/// Score with the default policy, the built-in India regions and no jitter
pub fn score_site(
    candidate: &Coordinate,
    renewables: &[RenewableSignal],
    demand: &[DemandSignal],
) -> Result<SiteAnalysis> {
    SiteScorer::default().analyze(candidate, renewables, demand, &mut NoJitter)
}

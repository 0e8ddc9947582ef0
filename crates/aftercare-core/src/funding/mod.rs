//! Indicative ICB / Local Authority funding split.
//!
//! Physical health needs fall to the ICB, Care Act needs to the Local
//! Authority, and s.117 needs are shared according to the local s.75
//! agreement percentage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{NeedCategory, NeedItem, Severity};

/// Default ICB share of the s.117 duty.
pub const DEFAULT_ICB_SHARE: u8 = 50;

/// How each need is scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FundingMethod {
    /// High=3, Medium=2, Low=1
    #[default]
    Weighted,
    /// Every need scores 1
    Count,
}

impl FundingMethod {
    pub fn score(&self, severity: Severity) -> f64 {
        match self {
            FundingMethod::Count => 1.0,
            FundingMethod::Weighted => f64::from(severity.weight()),
        }
    }
}

/// The computed split. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FundingSplit {
    pub total_score: f64,
    pub icb_score: f64,
    pub la_score: f64,
    pub icb_percentage: f64,
    pub la_percentage: f64,
    pub s117_score: f64,
    pub care_act_score: f64,
    pub physical_health_score: f64,
}

/// Compute the split for `needs`.
///
/// `icb_share` is the ICB percentage of the s.117 total (values above 100
/// are treated as 100). Both percentages are 0 when there is nothing to
/// split.
pub fn calculate_split(needs: &[NeedItem], icb_share: u8, method: FundingMethod) -> FundingSplit {
    let icb_share = f64::from(icb_share.min(100));

    let mut s117 = 0.0;
    let mut care_act = 0.0;
    let mut physical = 0.0;
    for need in needs {
        let score = method.score(need.severity);
        match need.category {
            NeedCategory::S117 => s117 += score,
            NeedCategory::CareAct => care_act += score,
            NeedCategory::PhysicalHealth => physical += score,
        }
    }

    let icb_total = physical + s117 * (icb_share / 100.0);
    let la_total = care_act + s117 * ((100.0 - icb_share) / 100.0);
    let total = icb_total + la_total;

    let (icb_percentage, la_percentage) = if total > 0.0 {
        (icb_total / total * 100.0, la_total / total * 100.0)
    } else {
        (0.0, 0.0)
    };

    debug!(
        needs = needs.len(),
        ?method,
        icb_share,
        total,
        icb_percentage,
        "funding split calculated"
    );

    FundingSplit {
        total_score: total,
        icb_score: icb_total,
        la_score: la_total,
        icb_percentage,
        la_percentage,
        s117_score: s117,
        care_act_score: care_act,
        physical_health_score: physical,
    }
}

impl FundingSplit {
    /// Percentages rounded to one decimal place for display.
    pub fn display_percentages(&self) -> (f64, f64) {
        let round = |v: f64| (v * 10.0).round() / 10.0;
        (round(self.icb_percentage), round(self.la_percentage))
    }
}

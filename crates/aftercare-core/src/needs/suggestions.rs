//! Common needs offered as starting points for each category.

use crate::models::NeedCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedNeed {
    pub label: &'static str,
    pub intervention: &'static str,
}

const S117_SUGGESTIONS: &[SuggestedNeed] = &[
    SuggestedNeed {
        label: "Medication management (Mental Health)",
        intervention: "Daily support worker visits to prompt/administer antipsychotic medication",
    },
    SuggestedNeed {
        label: "Social isolation / meaningful activity",
        intervention: "Support worker to facilitate access to community groups",
    },
    SuggestedNeed {
        label: "Managing distress / anxiety",
        intervention: "1:1 Psychology sessions or CPN monitoring",
    },
    SuggestedNeed {
        label: "Sensory regulation (Autism/ND)",
        intervention: "Occupational Therapy adaptations",
    },
];

const CARE_ACT_SUGGESTIONS: &[SuggestedNeed] = &[
    SuggestedNeed {
        label: "Personal care (Physical frailty)",
        intervention: "Carer calls AM/PM",
    },
    SuggestedNeed {
        label: "Nutrition (Physical inability)",
        intervention: "Meals on Wheels",
    },
];

const PHYSICAL_HEALTH_SUGGESTIONS: &[SuggestedNeed] = &[
    SuggestedNeed {
        label: "Diabetes management",
        intervention: "District Nurse to administer insulin",
    },
    SuggestedNeed {
        label: "Wound care",
        intervention: "District Nurse dressing changes",
    },
];

pub fn suggestions_for(category: NeedCategory) -> &'static [SuggestedNeed] {
    match category {
        NeedCategory::S117 => S117_SUGGESTIONS,
        NeedCategory::CareAct => CARE_ACT_SUGGESTIONS,
        NeedCategory::PhysicalHealth => PHYSICAL_HEALTH_SUGGESTIONS,
    }
}

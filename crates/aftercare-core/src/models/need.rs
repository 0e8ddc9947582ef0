//! Need items and their legal classification.

use serde::{Deserialize, Serialize};

/// Legal character of a need, which decides who funds it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NeedCategory {
    /// MHA 1983 s.117 after-care (joint ICB/LA duty)
    #[serde(rename = "S117 After-care")]
    S117,
    /// Care Act 2014 eligible need unrelated to the mental disorder (LA)
    #[serde(rename = "Care Act (Non-s117)")]
    CareAct,
    /// Physical healthcare (ICB)
    #[serde(rename = "Physical Health (NHS)")]
    PhysicalHealth,
}

impl NeedCategory {
    pub const ALL: [NeedCategory; 3] = [
        NeedCategory::S117,
        NeedCategory::CareAct,
        NeedCategory::PhysicalHealth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NeedCategory::S117 => "S117 After-care",
            NeedCategory::CareAct => "Care Act (Non-s117)",
            NeedCategory::PhysicalHealth => "Physical Health (NHS)",
        }
    }

    /// Agency that funds needs of this category.
    pub fn funding_source(&self) -> &'static str {
        match self {
            NeedCategory::PhysicalHealth => "ICB (NHS)",
            NeedCategory::CareAct => "Local Authority",
            NeedCategory::S117 => "Joint (ICB & LA)",
        }
    }

    /// Provider filled in when a suggested need is picked.
    pub fn default_provider(&self) -> &'static str {
        match self {
            NeedCategory::PhysicalHealth => "NHS",
            NeedCategory::CareAct => "Local Authority",
            NeedCategory::S117 => "Joint Funding",
        }
    }
}

/// Care domain a need belongs to. Declaration order is the plan's
/// section order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NeedDomain {
    #[serde(rename = "Appropriate accommodation; Environmental adjustments; Domestic cleaning")]
    Accommodation,
    #[serde(
        rename = "Meaningful occupation; Education; Daytime activities; Employment; Accessing the community; Using public transport"
    )]
    Occupation,
    #[serde(
        rename = "Physical healthcare including breathing, skin, mobility, physical health medication"
    )]
    PhysicalHealth,
    #[serde(rename = "Food and nutrition")]
    Nutrition,
    #[serde(rename = "Personal care; Continence/toileting; Dressing and laundry")]
    PersonalCare,
    #[serde(rename = "Assistance in welfare rights and managing finances")]
    Finance,
    #[serde(rename = "Social, cultural or spiritual needs")]
    SocialCultural,
    #[serde(rename = "Relationships; Loneliness; Isolation")]
    Relationships,
    #[serde(rename = "Parenting and caring needs")]
    Parenting,
    #[serde(rename = "Counselling and personal support")]
    Counselling,
    #[serde(rename = "Continuing mental health care; Psychotropic medication")]
    MentalHealth,
    #[serde(rename = "Psychological and emotional needs; Cognition; Behaviour")]
    Psychological,
    #[serde(
        rename = "Co-existing needs (physical disability, sensory impairment, learning disability or autism)"
    )]
    CoExisting,
    #[serde(rename = "Identified risks/safety issues")]
    RiskSafety,
    #[serde(rename = "Drug, alcohol & substance misuse")]
    SubstanceMisuse,
    #[serde(rename = "Age specific needs (children and young people / older adults)")]
    AgeSpecific,
    #[serde(rename = "Additional needs arising when in mental health crisis")]
    Crisis,
}

impl NeedDomain {
    pub const ALL: [NeedDomain; 17] = [
        NeedDomain::Accommodation,
        NeedDomain::Occupation,
        NeedDomain::PhysicalHealth,
        NeedDomain::Nutrition,
        NeedDomain::PersonalCare,
        NeedDomain::Finance,
        NeedDomain::SocialCultural,
        NeedDomain::Relationships,
        NeedDomain::Parenting,
        NeedDomain::Counselling,
        NeedDomain::MentalHealth,
        NeedDomain::Psychological,
        NeedDomain::CoExisting,
        NeedDomain::RiskSafety,
        NeedDomain::SubstanceMisuse,
        NeedDomain::AgeSpecific,
        NeedDomain::Crisis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NeedDomain::Accommodation => {
                "Appropriate accommodation; Environmental adjustments; Domestic cleaning"
            }
            NeedDomain::Occupation => "Meaningful occupation; Education; Daytime activities; Employment; Accessing the community; Using public transport",
            NeedDomain::PhysicalHealth => {
                "Physical healthcare including breathing, skin, mobility, physical health medication"
            }
            NeedDomain::Nutrition => "Food and nutrition",
            NeedDomain::PersonalCare => "Personal care; Continence/toileting; Dressing and laundry",
            NeedDomain::Finance => "Assistance in welfare rights and managing finances",
            NeedDomain::SocialCultural => "Social, cultural or spiritual needs",
            NeedDomain::Relationships => "Relationships; Loneliness; Isolation",
            NeedDomain::Parenting => "Parenting and caring needs",
            NeedDomain::Counselling => "Counselling and personal support",
            NeedDomain::MentalHealth => "Continuing mental health care; Psychotropic medication",
            NeedDomain::Psychological => "Psychological and emotional needs; Cognition; Behaviour",
            NeedDomain::CoExisting => "Co-existing needs (physical disability, sensory impairment, learning disability or autism)",
            NeedDomain::RiskSafety => "Identified risks/safety issues",
            NeedDomain::SubstanceMisuse => "Drug, alcohol & substance misuse",
            NeedDomain::AgeSpecific => "Age specific needs (children and young people / older adults)",
            NeedDomain::Crisis => "Additional needs arising when in mental health crisis",
        }
    }
}

/// How much a need weighs on the funding split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    /// Severity-weighted score (High=3, Medium=2, Low=1).
    pub fn weight(&self) -> u32 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// An assessed need admitted to the register. Immutable once added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NeedItem {
    /// UUID assigned on admission
    pub id: String,
    pub description: String,
    pub category: NeedCategory,
    pub domain: NeedDomain,
    pub intervention: String,
    /// Who delivers the intervention
    pub provider: String,
    pub severity: Severity,
    /// s.117 limb 1: need arises from or relates to the mental disorder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statutory_test_arises: Option<bool>,
    /// s.117 limb 2: service reduces the risk of deterioration/readmission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statutory_test_reduces_risk: Option<bool>,
}

//! Deprivation of liberty checker.
//!
//! Applies the Cheshire West acid test (continuous supervision and control,
//! not free to leave) and then chooses the authorisation route. This is a
//! read-only classifier; re-run it whenever an input changes.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::PatientDetails;

/// Age of majority for DoLS.
pub const ADULT_AGE: i32 = 18;

/// Where the proposed arrangements take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SettingType {
    /// Hospital or care home
    #[default]
    Institutional,
    /// Supported living, own home
    Community,
}

/// Everything the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DolInputs {
    pub supervision: bool,
    pub free_to_leave: bool,
    /// Unable to give valid consent to the arrangements
    pub unable_to_consent: bool,
    /// Community treatment order in force
    pub community_order: bool,
    /// Restricted patient (conditional discharge)
    pub restricted: bool,
    /// `None` when the date of birth cannot be read. Negative for a date
    /// of birth after today.
    pub age: Option<i32>,
    pub setting: SettingType,
}

impl DolInputs {
    /// Build inputs from the case record as of `today`.
    pub fn from_details(details: &PatientDetails, setting: SettingType, today: NaiveDate) -> Self {
        Self {
            supervision: details.dol_supervision,
            free_to_leave: details.dol_free_to_leave,
            unable_to_consent: details.dol_capacity,
            community_order: details.is_on_community_order(),
            restricted: details.is_restricted,
            age: age_from_dob(&details.dob, today),
            setting,
        }
    }

    /// Objective element: supervised and not free to leave.
    pub fn is_deprived(&self) -> bool {
        self.supervision && !self.free_to_leave
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DolStatus {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DolOutcome {
    NoDeprivation,
    /// Deprived but able to consent
    CapaciousPatient,
    /// CTO or conditional discharge cannot authorise a deprivation
    LegalConflict,
    Child { age: i32 },
    DolsAuthorisation,
    CourtAuthorisation,
}

impl DolOutcome {
    pub fn status(&self) -> DolStatus {
        match self {
            DolOutcome::NoDeprivation => DolStatus::Ok,
            DolOutcome::CapaciousPatient | DolOutcome::LegalConflict => DolStatus::Critical,
            DolOutcome::Child { .. }
            | DolOutcome::DolsAuthorisation
            | DolOutcome::CourtAuthorisation => DolStatus::Warning,
        }
    }

    pub fn message(&self) -> String {
        match self {
            DolOutcome::NoDeprivation => "No Deprivation of Liberty identified.".to_string(),
            DolOutcome::CapaciousPatient => {
                "Unlawful Deprivation of Liberty (Capacious Patient).".to_string()
            }
            DolOutcome::LegalConflict => "CRITICAL LEGAL RISK: 'MM' / 'PJ' Conflict.".to_string(),
            DolOutcome::Child { age } => format!("Deprivation of Liberty (Child aged {age})."),
            DolOutcome::DolsAuthorisation => "DoLS Authorisation Required.".to_string(),
            DolOutcome::CourtAuthorisation => "Court of Protection Order Required.".to_string(),
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            DolOutcome::NoDeprivation => "Based on the current assessment, the objective 'Acid Test' is not met. Ensure the care plan remains the least restrictive option and monitor for changes in supervision or freedom.",
            DolOutcome::CapaciousPatient => "A person with capacity cannot 'consent' to a deprivation of liberty in a way that avoids the need for a legal framework if the MHA is relevant (MM judgment). If they are not detained under the MHA, and you are exercising complete supervision and they are not free to leave, this is legally high-risk.",
            DolOutcome::LegalConflict => "The Supreme Court (in MM & PJ) ruled that neither a CTO nor a Conditional Discharge can authorise a deprivation of liberty. You must seek Court of Protection authorisation immediately.",
            DolOutcome::Child { .. } => "DoLS applies to adults (18+) only. Consider s.25 Children Act or Inherent Jurisdiction of the High Court.",
            DolOutcome::DolsAuthorisation => "Apply for a DoLS authorisation to the 'Supervisory Body' (the Local Authority). Ensure the 'Acid Test' findings are clearly documented in the application.",
            DolOutcome::CourtAuthorisation => "DoLS cannot be used in community settings (e.g. supported living). You must apply to the Court of Protection (likely via the 'Re X' streamlined procedure) to authorise this deprivation.",
        }
    }
}

/// Classification with its advisory text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DolAssessment {
    pub outcome: DolOutcome,
    pub status: DolStatus,
    pub message: String,
    pub recommendation: String,
    /// Whether choosing the other setting would change the outcome
    pub setting_applies: bool,
}

/// Classify the arrangements.
pub fn classify(inputs: &DolInputs) -> DolAssessment {
    let outcome = if !inputs.is_deprived() {
        DolOutcome::NoDeprivation
    } else if !inputs.unable_to_consent {
        DolOutcome::CapaciousPatient
    } else if inputs.community_order || inputs.restricted {
        DolOutcome::LegalConflict
    } else {
        match inputs.age {
            Some(age) if age < ADULT_AGE => DolOutcome::Child { age },
            _ => match inputs.setting {
                SettingType::Institutional => DolOutcome::DolsAuthorisation,
                SettingType::Community => DolOutcome::CourtAuthorisation,
            },
        }
    };

    debug!(?outcome, "deprivation of liberty classified");

    DolAssessment {
        outcome,
        status: outcome.status(),
        message: outcome.message(),
        recommendation: outcome.recommendation().to_string(),
        setting_applies: setting_applies(inputs),
    }
}

/// Whether the setting choice changes the outcome for these inputs.
pub fn setting_applies(inputs: &DolInputs) -> bool {
    inputs.is_deprived()
        && inputs.unable_to_consent
        && !inputs.community_order
        && !inputs.restricted
        && inputs.age.map_or(true, |age| age >= ADULT_AGE)
}

/// Age in whole years on `today`.
///
/// An empty date of birth counts as an adult; an unreadable one is unknown.
/// A date of birth in the future gives a negative age, which classifies as
/// a child.
pub fn age_from_dob(dob: &str, today: NaiveDate) -> Option<i32> {
    let dob = dob.trim();
    if dob.is_empty() {
        return Some(ADULT_AGE);
    }
    let birth = NaiveDate::parse_from_str(dob, "%Y-%m-%d").ok()?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deprived_adult() -> DolInputs {
        DolInputs {
            supervision: true,
            free_to_leave: false,
            unable_to_consent: true,
            community_order: false,
            restricted: false,
            age: Some(40),
            setting: SettingType::Institutional,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_no_supervision_means_no_deprivation() {
        for free_to_leave in [true, false] {
            let inputs = DolInputs {
                supervision: false,
                free_to_leave,
                restricted: true,
                age: Some(12),
                ..deprived_adult()
            };
            assert_eq!(classify(&inputs).outcome, DolOutcome::NoDeprivation);
            assert_eq!(classify(&inputs).status, DolStatus::Ok);
        }
    }

    #[test]
    fn test_capacious_patient() {
        let inputs = DolInputs {
            unable_to_consent: false,
            ..deprived_adult()
        };
        let assessment = classify(&inputs);
        assert_eq!(assessment.outcome, DolOutcome::CapaciousPatient);
        assert_eq!(assessment.status, DolStatus::Critical);
    }

    #[test]
    fn test_restricted_or_cto_conflict() {
        let restricted = DolInputs {
            restricted: true,
            ..deprived_adult()
        };
        let cto = DolInputs {
            community_order: true,
            age: Some(16),
            ..deprived_adult()
        };
        assert_eq!(classify(&restricted).outcome, DolOutcome::LegalConflict);
        assert_eq!(classify(&cto).outcome, DolOutcome::LegalConflict);
    }

    #[test]
    fn test_child_regardless_of_setting() {
        for setting in [SettingType::Institutional, SettingType::Community] {
            let inputs = DolInputs {
                age: Some(16),
                setting,
                ..deprived_adult()
            };
            let assessment = classify(&inputs);
            assert_eq!(assessment.outcome, DolOutcome::Child { age: 16 });
            assert_eq!(assessment.message, "Deprivation of Liberty (Child aged 16).");
            assert!(!assessment.setting_applies);
        }
    }

    #[test]
    fn test_setting_selects_route() {
        let institutional = deprived_adult();
        let community = DolInputs {
            setting: SettingType::Community,
            ..deprived_adult()
        };
        assert_eq!(classify(&institutional).outcome, DolOutcome::DolsAuthorisation);
        assert_eq!(classify(&community).outcome, DolOutcome::CourtAuthorisation);
        assert!(classify(&community).setting_applies);
    }

    #[test]
    fn test_age_birthday_adjustment() {
        let today = date("2024-06-15");
        assert_eq!(age_from_dob("2006-06-15", today), Some(18));
        assert_eq!(age_from_dob("2006-06-16", today), Some(17));
        assert_eq!(age_from_dob("2006-05-30", today), Some(18));
        assert_eq!(age_from_dob("", today), Some(18));
        assert_eq!(age_from_dob("not a date", today), None);
        assert_eq!(age_from_dob("2030-01-01", today), Some(-6));

        let unborn = DolInputs {
            age: age_from_dob("2030-01-01", today),
            ..deprived_adult()
        };
        assert_eq!(classify(&unborn).outcome, DolOutcome::Child { age: -6 });
    }

    #[test]
    fn test_inputs_from_details() {
        let mut details = PatientDetails::default();
        details.dol_supervision = true;
        details.dol_free_to_leave = false;
        details.dol_capacity = true;
        details.mha_section = "CTO".into();
        details.dob = "1990-01-01".into();

        let inputs = DolInputs::from_details(&details, SettingType::Community, date("2024-01-01"));
        assert!(inputs.is_deprived());
        assert!(inputs.community_order);
        assert_eq!(inputs.age, Some(34));
        assert_eq!(classify(&inputs).outcome, DolOutcome::LegalConflict);
    }
}

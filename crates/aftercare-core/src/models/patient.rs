//! Patient details record and its typed field setter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Default confidence score for a fresh plan.
pub const DEFAULT_DECISION_CONFIDENCE: u8 = 70;

/// Highest confidence score.
pub const MAX_DECISION_CONFIDENCE: u8 = 100;

/// Workflow state of the plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CaseStatus {
    #[default]
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    Finalised,
}

impl CaseStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Draft => "Draft",
            CaseStatus::InReview => "In Review",
            CaseStatus::Finalised => "Finalised",
        }
    }
}

/// Whether an ordinary-residence or Who Pays dispute is open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DisputeStatus {
    #[default]
    None,
    Active,
}

/// The case record a caseworker fills in across the assessment.
///
/// Keys serialize in camelCase so the saved blob matches the browser
/// tool's storage format. Missing keys fall back to [`Default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDetails {
    // Demographic
    pub name: String,
    pub address: String,
    /// Date of birth, ISO `YYYY-MM-DD` when set
    pub dob: String,
    pub nhs_number: String,
    pub social_care_id: String,
    pub lac_status: String,
    pub first_language: String,

    // Legal / MHA
    /// MHA section code, see [`super::MHA_SECTIONS`]
    pub mha_section: String,
    pub is_restricted: bool,
    pub moj_case_worker: String,
    pub detention_start_date: String,
    pub conditions_of_discharge: String,
    pub diagnoses: String,
    pub s117_rights: String,
    pub legal_frameworks: String,
    pub is_initial_plan: bool,
    pub is_review_plan: bool,
    /// Evidence that services reduce the risk of readmission (limb 2)
    pub s117_limb2_evidence: String,

    // DoL / capacity
    pub dol_supervision: bool,
    pub dol_free_to_leave: bool,
    /// True when the person is unable to give valid consent
    pub dol_capacity: bool,
    pub mca_assessment_rationale: String,
    pub best_interests_rationale: String,

    // Advocacy
    pub imha_referral_done: bool,
    pub imca_referral_done: bool,

    // Responsibility
    #[serde(rename = "responsibleLA")]
    pub responsible_la: String,
    #[serde(rename = "responsibleICB")]
    pub responsible_icb: String,
    pub responsibility_rationale: String,
    pub dispute_status: DisputeStatus,

    // Professionals & contacts
    pub nearest_relative: String,
    pub family_members: String,
    pub victim_liaison_officer: String,
    pub advocate_contact: String,
    pub consultant_name: String,
    pub care_coordinator: String,
    pub social_worker_name: String,
    pub gp_contact: String,
    pub other_pros: String,

    // Plan meta
    pub setting: String,
    pub current_arrangements: String,
    pub confidence_level: String,
    /// 0-100. Larger stored values are clamped on load.
    #[serde(deserialize_with = "clamped_confidence")]
    pub decision_confidence: u8,
    pub decision_confidence_notes: String,
    pub statutory_funding: String,
    pub completed_by: String,
    pub designation: String,
    pub completion_date: String,
    pub version: String,
    pub is_ending: bool,
    pub next_review_date: String,
    pub case_status: CaseStatus,
    pub clinician_name: String,

    // Comments
    pub person_comments: String,
    pub family_comments: String,
    pub advocate_comments: String,
    pub next_steps: String,
}

impl Default for PatientDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            dob: String::new(),
            nhs_number: String::new(),
            social_care_id: String::new(),
            lac_status: String::new(),
            first_language: String::new(),
            mha_section: String::new(),
            is_restricted: false,
            moj_case_worker: String::new(),
            detention_start_date: String::new(),
            conditions_of_discharge: String::new(),
            diagnoses: String::new(),
            s117_rights: String::new(),
            legal_frameworks: String::new(),
            is_initial_plan: true,
            is_review_plan: false,
            s117_limb2_evidence: String::new(),
            dol_supervision: false,
            dol_free_to_leave: true,
            dol_capacity: false,
            mca_assessment_rationale: String::new(),
            best_interests_rationale: String::new(),
            imha_referral_done: false,
            imca_referral_done: false,
            responsible_la: String::new(),
            responsible_icb: String::new(),
            responsibility_rationale: String::new(),
            dispute_status: DisputeStatus::None,
            nearest_relative: String::new(),
            family_members: String::new(),
            victim_liaison_officer: String::new(),
            advocate_contact: String::new(),
            consultant_name: String::new(),
            care_coordinator: String::new(),
            social_worker_name: String::new(),
            gp_contact: String::new(),
            other_pros: String::new(),
            setting: String::new(),
            current_arrangements: String::new(),
            confidence_level: String::new(),
            decision_confidence: DEFAULT_DECISION_CONFIDENCE,
            decision_confidence_notes: String::new(),
            statutory_funding: String::new(),
            completed_by: String::new(),
            designation: String::new(),
            completion_date: chrono::Local::now().date_naive().to_string(),
            version: "1.0".to_string(),
            is_ending: false,
            next_review_date: String::new(),
            case_status: CaseStatus::Draft,
            clinician_name: String::new(),
            person_comments: String::new(),
            family_comments: String::new(),
            advocate_comments: String::new(),
            next_steps: String::new(),
        }
    }
}

/// Errors from the typed field setter.
#[derive(Error, Debug, PartialEq)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected} value, got {actual}")]
    KindMismatch {
        field: &'static str,
        expected: FieldKind,
        actual: FieldKind,
    },

    #[error("Field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u32 },

    #[error("Field {field} cannot take the value {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// The shape of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Confidence,
    CaseStatus,
    DisputeStatus,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Flag => "flag",
            FieldKind::Confidence => "confidence",
            FieldKind::CaseStatus => "case status",
            FieldKind::DisputeStatus => "dispute status",
        };
        f.write_str(name)
    }
}

/// A value assigned to (or read from) a [`PatientField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Confidence(u8),
    CaseStatus(CaseStatus),
    DisputeStatus(DisputeStatus),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Confidence(_) => FieldKind::Confidence,
            FieldValue::CaseStatus(_) => FieldKind::CaseStatus,
            FieldValue::DisputeStatus(_) => FieldKind::DisputeStatus,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// A storage slot inside [`PatientDetails`] that accepts one kind of value.
trait FieldSlot {
    fn kind(&self) -> FieldKind;
    fn read(&self) -> FieldValue;
    /// Stores `value`; the caller has already checked the kind.
    fn write(&mut self, value: FieldValue);
}

impl FieldSlot for String {
    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }
    fn read(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
    fn write(&mut self, value: FieldValue) {
        if let FieldValue::Text(text) = value {
            *self = text;
        }
    }
}

impl FieldSlot for bool {
    fn kind(&self) -> FieldKind {
        FieldKind::Flag
    }
    fn read(&self) -> FieldValue {
        FieldValue::Flag(*self)
    }
    fn write(&mut self, value: FieldValue) {
        if let FieldValue::Flag(flag) = value {
            *self = flag;
        }
    }
}

impl FieldSlot for u8 {
    fn kind(&self) -> FieldKind {
        FieldKind::Confidence
    }
    fn read(&self) -> FieldValue {
        FieldValue::Confidence(*self)
    }
    fn write(&mut self, value: FieldValue) {
        if let FieldValue::Confidence(score) = value {
            *self = score;
        }
    }
}

impl FieldSlot for CaseStatus {
    fn kind(&self) -> FieldKind {
        FieldKind::CaseStatus
    }
    fn read(&self) -> FieldValue {
        FieldValue::CaseStatus(*self)
    }
    fn write(&mut self, value: FieldValue) {
        if let FieldValue::CaseStatus(status) = value {
            *self = status;
        }
    }
}

impl FieldSlot for DisputeStatus {
    fn kind(&self) -> FieldKind {
        FieldKind::DisputeStatus
    }
    fn read(&self) -> FieldValue {
        FieldValue::DisputeStatus(*self)
    }
    fn write(&mut self, value: FieldValue) {
        if let FieldValue::DisputeStatus(status) = value {
            *self = status;
        }
    }
}

/// Declares [`PatientField`] together with its serialized key and the
/// struct member it addresses, so the three can never drift apart.
macro_rules! patient_fields {
    ($($variant:ident => $member:ident, $key:literal;)+) => {
        /// Identifier of every editable field on [`PatientDetails`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PatientField {
            $($variant,)+
        }

        impl PatientField {
            /// All fields in declaration order.
            pub const ALL: &'static [PatientField] = &[$(PatientField::$variant,)+];

            /// The camelCase key used in saved and exported JSON.
            pub fn key(&self) -> &'static str {
                match self {
                    $(PatientField::$variant => $key,)+
                }
            }
        }

        impl FromStr for PatientField {
            type Err = FieldError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(PatientField::$variant),)+
                    other => Err(FieldError::UnknownField(other.to_string())),
                }
            }
        }

        impl PatientDetails {
            fn slot(&self, field: PatientField) -> &dyn FieldSlot {
                match field {
                    $(PatientField::$variant => &self.$member,)+
                }
            }

            fn slot_mut(&mut self, field: PatientField) -> &mut dyn FieldSlot {
                match field {
                    $(PatientField::$variant => &mut self.$member,)+
                }
            }
        }
    };
}

patient_fields! {
    Name => name, "name";
    Address => address, "address";
    Dob => dob, "dob";
    NhsNumber => nhs_number, "nhsNumber";
    SocialCareId => social_care_id, "socialCareId";
    LacStatus => lac_status, "lacStatus";
    FirstLanguage => first_language, "firstLanguage";
    MhaSection => mha_section, "mhaSection";
    IsRestricted => is_restricted, "isRestricted";
    MojCaseWorker => moj_case_worker, "mojCaseWorker";
    DetentionStartDate => detention_start_date, "detentionStartDate";
    ConditionsOfDischarge => conditions_of_discharge, "conditionsOfDischarge";
    Diagnoses => diagnoses, "diagnoses";
    S117Rights => s117_rights, "s117Rights";
    LegalFrameworks => legal_frameworks, "legalFrameworks";
    IsInitialPlan => is_initial_plan, "isInitialPlan";
    IsReviewPlan => is_review_plan, "isReviewPlan";
    S117Limb2Evidence => s117_limb2_evidence, "s117Limb2Evidence";
    DolSupervision => dol_supervision, "dolSupervision";
    DolFreeToLeave => dol_free_to_leave, "dolFreeToLeave";
    DolCapacity => dol_capacity, "dolCapacity";
    McaAssessmentRationale => mca_assessment_rationale, "mcaAssessmentRationale";
    BestInterestsRationale => best_interests_rationale, "bestInterestsRationale";
    ImhaReferralDone => imha_referral_done, "imhaReferralDone";
    ImcaReferralDone => imca_referral_done, "imcaReferralDone";
    ResponsibleLa => responsible_la, "responsibleLA";
    ResponsibleIcb => responsible_icb, "responsibleICB";
    ResponsibilityRationale => responsibility_rationale, "responsibilityRationale";
    DisputeStatus => dispute_status, "disputeStatus";
    NearestRelative => nearest_relative, "nearestRelative";
    FamilyMembers => family_members, "familyMembers";
    VictimLiaisonOfficer => victim_liaison_officer, "victimLiaisonOfficer";
    AdvocateContact => advocate_contact, "advocateContact";
    ConsultantName => consultant_name, "consultantName";
    CareCoordinator => care_coordinator, "careCoordinator";
    SocialWorkerName => social_worker_name, "socialWorkerName";
    GpContact => gp_contact, "gpContact";
    OtherPros => other_pros, "otherPros";
    Setting => setting, "setting";
    CurrentArrangements => current_arrangements, "currentArrangements";
    ConfidenceLevel => confidence_level, "confidenceLevel";
    DecisionConfidence => decision_confidence, "decisionConfidence";
    DecisionConfidenceNotes => decision_confidence_notes, "decisionConfidenceNotes";
    StatutoryFunding => statutory_funding, "statutoryFunding";
    CompletedBy => completed_by, "completedBy";
    Designation => designation, "designation";
    CompletionDate => completion_date, "completionDate";
    Version => version, "version";
    IsEnding => is_ending, "isEnding";
    NextReviewDate => next_review_date, "nextReviewDate";
    CaseStatus => case_status, "caseStatus";
    ClinicianName => clinician_name, "clinicianName";
    PersonComments => person_comments, "personComments";
    FamilyComments => family_comments, "familyComments";
    AdvocateComments => advocate_comments, "advocateComments";
    NextSteps => next_steps, "nextSteps";
}

impl PatientField {
    /// The kind of value this field accepts.
    pub fn kind(&self) -> FieldKind {
        PatientDetails::default().slot(*self).kind()
    }

    /// Read a value for this field from text: `true`/`false` for flags, a
    /// whole number for confidence, the display label for statuses.
    pub fn parse_value(&self, raw: &str) -> Result<FieldValue, FieldError> {
        let invalid = || FieldError::InvalidValue {
            field: self.key(),
            value: raw.to_string(),
        };
        match self.kind() {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Flag => match raw.trim() {
                "true" | "yes" => Ok(FieldValue::Flag(true)),
                "false" | "no" => Ok(FieldValue::Flag(false)),
                _ => Err(invalid()),
            },
            FieldKind::Confidence => {
                let score: u32 = raw.trim().parse().map_err(|_| invalid())?;
                let score = u8::try_from(score).map_err(|_| FieldError::OutOfRange {
                    field: self.key(),
                    value: score,
                })?;
                Ok(FieldValue::Confidence(score))
            }
            FieldKind::CaseStatus => [CaseStatus::Draft, CaseStatus::InReview, CaseStatus::Finalised]
                .into_iter()
                .find(|status| status.label() == raw.trim())
                .map(FieldValue::CaseStatus)
                .ok_or_else(invalid),
            FieldKind::DisputeStatus => match raw.trim() {
                "None" => Ok(FieldValue::DisputeStatus(DisputeStatus::None)),
                "Active" => Ok(FieldValue::DisputeStatus(DisputeStatus::Active)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl PatientDetails {
    /// Assign a single field.
    ///
    /// The value must match the field's kind; confidence scores are capped
    /// at 100.
    pub fn set(&mut self, field: PatientField, value: FieldValue) -> Result<(), FieldError> {
        let slot = self.slot_mut(field);
        let expected = slot.kind();
        let actual = value.kind();
        if expected != actual {
            return Err(FieldError::KindMismatch {
                field: field.key(),
                expected,
                actual,
            });
        }
        if let FieldValue::Confidence(score) = value {
            if score > MAX_DECISION_CONFIDENCE {
                return Err(FieldError::OutOfRange {
                    field: field.key(),
                    value: u32::from(score),
                });
            }
        }
        slot.write(value);
        Ok(())
    }

    /// Read a single field.
    pub fn get(&self, field: PatientField) -> FieldValue {
        self.slot(field).read()
    }

    /// Whether the mental health act section is a community treatment order.
    pub fn is_on_community_order(&self) -> bool {
        self.mha_section == "CTO"
    }

    /// Objective acid test: continuous supervision and not free to leave.
    pub fn meets_acid_test(&self) -> bool {
        self.dol_supervision && !self.dol_free_to_leave
    }
}

fn clamped_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let score = u8::deserialize(deserializer)?;
    Ok(score.min(MAX_DECISION_CONFIDENCE))
}

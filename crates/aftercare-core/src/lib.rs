//! Aftercare Core Library
//!
//! Decision support for mental health discharge planning: s.117 after-care
//! entitlement, ICB / Local Authority responsibility, deprivation of liberty
//! safeguards and indicative funding apportionment.
//!
//! # Architecture
//!
//! ```text
//!   Patient record ◄──── Wizards (capacity, nearest relative, ICB / LA)
//!         │
//!         ├──── DoL checker (acid test → authorisation route)
//!         │
//!   Needs register ────► Funding split (ICB % / LA %)
//!         │
//!         ▼
//!   ┌──────────────────────────────┐
//!   │         CaseSession          │
//!   └───────┬──────────┬───────────┘
//!           │          │           │
//!           ▼          ▼           ▼
//!       Saved work  Case file   Support plan
//!       (SQLite)    (JSON)      (Markdown)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Patient record, needs and the MHA section table
//! - [`wizards`]: Capacity, nearest relative and responsibility wizards
//! - [`dol`]: Deprivation of liberty classifier
//! - [`needs`]: Needs register, suggestions and Care Act wording
//! - [`funding`]: ICB / LA split calculator
//! - [`session`]: The case store driving all of the above
//! - [`db`]: SQLite saved-work storage
//! - [`export`]: Case file JSON and the printable support plan

pub mod db;
pub mod dol;
pub mod export;
pub mod funding;
pub mod models;
pub mod needs;
pub mod session;
pub mod wizards;

// Re-export commonly used types
pub use db::Database;
pub use funding::{calculate_split, FundingMethod, FundingSplit};
pub use models::{NeedCategory, NeedDomain, NeedItem, PatientDetails, PatientField, Severity};
pub use needs::{NeedsRegister, NewNeed};
pub use session::CaseSession;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use dol::{DolAssessment, DolStatus, SettingType};
use needs::CareActChecklist;
use session::{Notification, NotificationKind, Progress, SessionError};
use wizards::{
    CapacityWizard, CareActPlacement, CaringRelative, FunctionalTest, NearestRelativeWizard,
    PlacementType, RelativesPresent, ResponsibilityKind, ResponsibilityWizard, WizardError,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum AftercareError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for AftercareError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Json(err) => AftercareError::SerializationError(err.to_string()),
            other => AftercareError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AftercareError {
    fn from(e: serde_json::Error) -> Self {
        AftercareError::SerializationError(e.to_string())
    }
}

impl From<models::FieldError> for AftercareError {
    fn from(e: models::FieldError) -> Self {
        AftercareError::InvalidInput(e.to_string())
    }
}

impl From<needs::NeedError> for AftercareError {
    fn from(e: needs::NeedError) -> Self {
        AftercareError::InvalidInput(e.to_string())
    }
}

impl From<WizardError> for AftercareError {
    fn from(e: WizardError) -> Self {
        AftercareError::InvalidInput(e.to_string())
    }
}

impl From<SessionError> for AftercareError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Field(err) => err.into(),
            SessionError::Need(err) => err.into(),
            SessionError::Storage(err) => err.into(),
            SessionError::CaseFile(err) => err.into(),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for AftercareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        AftercareError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the saved-work database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<AftercareCore>, AftercareError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(AftercareCore::new(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<AftercareCore>, AftercareError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(AftercareCore::new(db)))
}

/// Labels of every need domain, in display order.
#[uniffi::export]
pub fn need_domains() -> Vec<String> {
    NeedDomain::ALL.iter().map(|d| d.label().to_string()).collect()
}

/// Suggested needs for a category, with the default provider filled in.
#[uniffi::export]
pub fn suggested_needs(category: FfiNeedCategory) -> Vec<FfiNeedSuggestion> {
    let category = NeedCategory::from(category);
    needs::suggestions_for(category)
        .iter()
        .map(|s| FfiNeedSuggestion {
            label: s.label.to_string(),
            intervention: s.intervention.to_string(),
            provider: category.default_provider().to_string(),
        })
        .collect()
}

/// Build a Care Act eligibility need description from checklist selections.
#[uniffi::export]
pub fn describe_care_act_needs(
    selections: Vec<FfiCareActSelection>,
    significant_impact: bool,
) -> Option<String> {
    let mut checklist = CareActChecklist::new();
    for selection in &selections {
        checklist.select_outcome(selection.outcome as usize, selection.criterion as usize);
    }
    checklist.significant_impact = significant_impact;
    checklist.describe()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe case session and storage for FFI.
#[derive(uniffi::Object)]
pub struct AftercareCore {
    session: Arc<Mutex<CaseSession>>,
    db: Arc<Mutex<Database>>,
}

impl AftercareCore {
    fn new(db: Database) -> Self {
        Self {
            session: Arc::new(Mutex::new(CaseSession::new())),
            db: Arc::new(Mutex::new(db)),
        }
    }
}

#[uniffi::export]
impl AftercareCore {
    // =========================================================================
    // Patient Record
    // =========================================================================

    /// Set a field by its JSON key, parsing `value` for the field's kind.
    pub fn set_field(&self, key: String, value: String) -> Result<(), AftercareError> {
        let field: PatientField = key.parse()?;
        let value = field.parse_value(&value)?;
        let mut session = self.session.lock()?;
        session.update(field, value)?;
        Ok(())
    }

    /// The whole patient record as camelCase JSON.
    pub fn patient_details_json(&self) -> Result<String, AftercareError> {
        let session = self.session.lock()?;
        Ok(serde_json::to_string(session.details())?)
    }

    // =========================================================================
    // Wizards
    // =========================================================================

    /// Run the capacity assessment and record it on the case.
    pub fn assess_capacity(
        &self,
        decision: String,
        functional: FfiFunctionalTest,
        impairment: Option<bool>,
    ) -> Result<FfiCapacityOutcome, AftercareError> {
        let mut wizard = CapacityWizard::new();
        wizard.define_decision(&decision)?;
        let outcome = match wizard.submit_functional_test(functional.into())? {
            Some(outcome) => outcome,
            None => {
                let impairment =
                    impairment.ok_or(WizardError::MissingAnswer("impairment test"))?;
                wizard.submit_impairment(impairment)?
            }
        };

        let mut session = self.session.lock()?;
        session.apply_capacity(&outcome);
        Ok(FfiCapacityOutcome {
            lacks_capacity: outcome.result,
            rationale: outcome.rationale,
        })
    }

    /// Identify the s.26 nearest relative and record it on the case.
    pub fn identify_nearest_relative(
        &self,
        answers: FfiNearestRelativeAnswers,
    ) -> Result<FfiWizardOutcome, AftercareError> {
        let mut wizard = NearestRelativeWizard::new();
        wizard.answer_has_partner(answers.has_partner)?;
        let mut outcome = None;
        if answers.has_partner {
            outcome = wizard.answer_partner_eligible(answers.partner_eligible)?;
        }
        if outcome.is_none() {
            outcome = wizard.answer_residing_or_caring(answers.residing_or_caring.map(Into::into))?;
        }
        let outcome = match outcome {
            Some(outcome) => outcome,
            None => wizard.answer_hierarchy(RelativesPresent {
                children: answers.children,
                parents: answers.parents,
                siblings: answers.siblings,
            })?,
        };

        let mut session = self.session.lock()?;
        session.apply_nearest_relative(&outcome);
        Ok(FfiWizardOutcome {
            result: outcome.result.label().to_string(),
            rationale: outcome.rationale,
        })
    }

    /// Determine the responsible ICB and record it on the case.
    pub fn determine_icb_responsibility(
        &self,
        gp_icb: String,
        re_detention: bool,
    ) -> Result<FfiWizardOutcome, AftercareError> {
        let mut wizard = ResponsibilityWizard::new(ResponsibilityKind::Icb);
        wizard.answer_re_detention(re_detention)?;
        let outcome = wizard.submit_gp_icb(&gp_icb)?;

        let mut session = self.session.lock()?;
        session.apply_icb_responsibility(&outcome);
        Ok(FfiWizardOutcome {
            result: outcome.result,
            rationale: outcome.rationale,
        })
    }

    /// Determine both Local Authority duties and record the s.117 authority.
    pub fn determine_la_responsibility(
        &self,
        residence: String,
        re_detention: bool,
        placement: FfiCareActPlacement,
    ) -> Result<FfiLaOutcome, AftercareError> {
        let mut wizard = ResponsibilityWizard::new(ResponsibilityKind::LocalAuthority);
        wizard.answer_re_detention(re_detention)?;
        wizard.submit_residence(&residence)?;
        let outcome = wizard.submit_placement(&placement.into())?;

        let mut session = self.session.lock()?;
        session.apply_la_responsibility(&outcome);
        Ok(FfiLaOutcome {
            s117_authority: outcome.result.s117_authority,
            care_act_authority: outcome.result.care_act_authority,
            rationale: outcome.rationale,
        })
    }

    // =========================================================================
    // Needs
    // =========================================================================

    /// Add a need. Returns the new need's id.
    pub fn add_need(&self, need: FfiNewNeed) -> Result<String, AftercareError> {
        let need = NewNeed::try_from(need)?;
        let mut session = self.session.lock()?;
        Ok(session.add_need(need)?)
    }

    pub fn remove_need(&self, id: String) -> Result<bool, AftercareError> {
        let mut session = self.session.lock()?;
        Ok(session.remove_need(&id))
    }

    pub fn list_needs(&self) -> Result<Vec<FfiNeedItem>, AftercareError> {
        let session = self.session.lock()?;
        Ok(session.needs().items().iter().map(|n| n.into()).collect())
    }

    // =========================================================================
    // Funding & DoL
    // =========================================================================

    pub fn set_funding_options(
        &self,
        icb_share: u8,
        method: FfiFundingMethod,
    ) -> Result<(), AftercareError> {
        let mut session = self.session.lock()?;
        session.set_icb_share(icb_share);
        session.set_funding_method(method.into());
        Ok(())
    }

    pub fn funding_split(&self) -> Result<FfiFundingSplit, AftercareError> {
        let session = self.session.lock()?;
        Ok(session.funding().into())
    }

    /// Classify the current arrangements as of today.
    pub fn assess_dol(&self, setting: FfiSettingType) -> Result<FfiDolAssessment, AftercareError> {
        let mut session = self.session.lock()?;
        session.set_dol_setting(setting.into());
        let today = chrono::Local::now().date_naive();
        Ok(session.dol_assessment(today).into())
    }

    // =========================================================================
    // Progress, Plan & Notifications
    // =========================================================================

    pub fn progress(&self) -> Result<FfiProgress, AftercareError> {
        let session = self.session.lock()?;
        Ok(session.progress().into())
    }

    /// Support plan rendered as Markdown.
    pub fn support_plan(&self) -> Result<String, AftercareError> {
        let session = self.session.lock()?;
        Ok(session.support_plan())
    }

    /// The current notification, if any and not yet expired.
    pub fn current_notification(&self) -> Result<Option<FfiNotification>, AftercareError> {
        let session = self.session.lock()?;
        Ok(session.notification(chrono::Utc::now()).map(|n| n.into()))
    }

    pub fn dismiss_notification(&self) -> Result<(), AftercareError> {
        let mut session = self.session.lock()?;
        session.dismiss_notification();
        Ok(())
    }

    // =========================================================================
    // Save, Load, Export
    // =========================================================================

    pub fn save(&self) -> Result<(), AftercareError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        session.save(&db)?;
        Ok(())
    }

    /// Restore saved work. Returns false when nothing was saved.
    pub fn load(&self) -> Result<bool, AftercareError> {
        let mut session = self.session.lock()?;
        let db = self.db.lock()?;
        Ok(session.load(&db)?)
    }

    pub fn export_json(&self) -> Result<FfiCaseFile, AftercareError> {
        let mut session = self.session.lock()?;
        let (filename, json) = session.export_json()?;
        Ok(FfiCaseFile { filename, json })
    }

    pub fn import_json(&self, json: String) -> Result<(), AftercareError> {
        let mut session = self.session.lock()?;
        session.import_json(&json)?;
        Ok(())
    }

    pub fn reset(&self) -> Result<(), AftercareError> {
        let mut session = self.session.lock()?;
        session.reset();
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiNeedCategory {
    S117,
    CareAct,
    PhysicalHealth,
}

impl From<FfiNeedCategory> for NeedCategory {
    fn from(category: FfiNeedCategory) -> Self {
        match category {
            FfiNeedCategory::S117 => NeedCategory::S117,
            FfiNeedCategory::CareAct => NeedCategory::CareAct,
            FfiNeedCategory::PhysicalHealth => NeedCategory::PhysicalHealth,
        }
    }
}

impl From<NeedCategory> for FfiNeedCategory {
    fn from(category: NeedCategory) -> Self {
        match category {
            NeedCategory::S117 => FfiNeedCategory::S117,
            NeedCategory::CareAct => FfiNeedCategory::CareAct,
            NeedCategory::PhysicalHealth => FfiNeedCategory::PhysicalHealth,
        }
    }
}

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiSeverity {
    Low,
    Medium,
    High,
}

impl From<FfiSeverity> for Severity {
    fn from(severity: FfiSeverity) -> Self {
        match severity {
            FfiSeverity::Low => Severity::Low,
            FfiSeverity::Medium => Severity::Medium,
            FfiSeverity::High => Severity::High,
        }
    }
}

impl From<Severity> for FfiSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => FfiSeverity::Low,
            Severity::Medium => FfiSeverity::Medium,
            Severity::High => FfiSeverity::High,
        }
    }
}

/// FFI-safe need as entered. `domain` is the domain label.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewNeed {
    pub description: String,
    pub category: FfiNeedCategory,
    pub domain: String,
    pub intervention: String,
    pub provider: String,
    pub severity: FfiSeverity,
    pub statutory_test_arises: bool,
    pub statutory_test_reduces_risk: bool,
}

impl TryFrom<FfiNewNeed> for NewNeed {
    type Error = AftercareError;

    fn try_from(need: FfiNewNeed) -> Result<Self, Self::Error> {
        let domain = NeedDomain::ALL
            .into_iter()
            .find(|d| d.label() == need.domain)
            .ok_or_else(|| AftercareError::InvalidInput(format!("Unknown domain: {}", need.domain)))?;
        Ok(NewNeed {
            description: need.description,
            category: need.category.into(),
            domain,
            intervention: need.intervention,
            provider: need.provider,
            severity: need.severity.into(),
            statutory_test_arises: need.statutory_test_arises,
            statutory_test_reduces_risk: need.statutory_test_reduces_risk,
        })
    }
}

/// FFI-safe admitted need.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNeedItem {
    pub id: String,
    pub description: String,
    pub category: FfiNeedCategory,
    pub domain: String,
    pub intervention: String,
    pub provider: String,
    pub severity: FfiSeverity,
    pub funding_source: String,
}

impl From<&NeedItem> for FfiNeedItem {
    fn from(need: &NeedItem) -> Self {
        Self {
            id: need.id.clone(),
            description: need.description.clone(),
            category: need.category.into(),
            domain: need.domain.label().to_string(),
            intervention: need.intervention.clone(),
            provider: need.provider.clone(),
            severity: need.severity.into(),
            funding_source: need.category.funding_source().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNeedSuggestion {
    pub label: String,
    pub intervention: String,
    pub provider: String,
}

/// One ticked Care Act outcome and the reason it cannot be achieved.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCareActSelection {
    pub outcome: u32,
    pub criterion: u32,
}

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiFundingMethod {
    Weighted,
    Count,
}

impl From<FfiFundingMethod> for FundingMethod {
    fn from(method: FfiFundingMethod) -> Self {
        match method {
            FfiFundingMethod::Weighted => FundingMethod::Weighted,
            FfiFundingMethod::Count => FundingMethod::Count,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFundingSplit {
    pub total_score: f64,
    pub icb_score: f64,
    pub la_score: f64,
    pub icb_percentage: f64,
    pub la_percentage: f64,
    pub s117_score: f64,
    pub care_act_score: f64,
    pub physical_health_score: f64,
}

impl From<FundingSplit> for FfiFundingSplit {
    fn from(split: FundingSplit) -> Self {
        Self {
            total_score: split.total_score,
            icb_score: split.icb_score,
            la_score: split.la_score,
            icb_percentage: split.icb_percentage,
            la_percentage: split.la_percentage,
            s117_score: split.s117_score,
            care_act_score: split.care_act_score,
            physical_health_score: split.physical_health_score,
        }
    }
}

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiSettingType {
    Institutional,
    Community,
}

impl From<FfiSettingType> for SettingType {
    fn from(setting: FfiSettingType) -> Self {
        match setting {
            FfiSettingType::Institutional => SettingType::Institutional,
            FfiSettingType::Community => SettingType::Community,
        }
    }
}

/// FFI-safe DoL result. `status` is one of `ok`, `warning`, `critical`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDolAssessment {
    pub status: String,
    pub message: String,
    pub recommendation: String,
    /// Whether the host should offer the setting choice
    pub setting_applies: bool,
}

impl From<DolAssessment> for FfiDolAssessment {
    fn from(assessment: DolAssessment) -> Self {
        let status = match assessment.status {
            DolStatus::Ok => "ok",
            DolStatus::Warning => "warning",
            DolStatus::Critical => "critical",
        };
        Self {
            status: status.to_string(),
            message: assessment.message,
            recommendation: assessment.recommendation,
            setting_applies: assessment.setting_applies,
        }
    }
}

#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiFunctionalTest {
    pub understand: bool,
    pub retain: bool,
    pub use_information: bool,
    pub weigh: bool,
    pub communicate: bool,
}

impl From<FfiFunctionalTest> for FunctionalTest {
    fn from(answers: FfiFunctionalTest) -> Self {
        FunctionalTest {
            understand: answers.understand,
            retain: answers.retain,
            use_information: answers.use_information,
            weigh: answers.weigh,
            communicate: answers.communicate,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCapacityOutcome {
    pub lacks_capacity: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiCaringRelative {
    Child,
    Parent,
    Sibling,
    Other,
}

impl From<FfiCaringRelative> for CaringRelative {
    fn from(relative: FfiCaringRelative) -> Self {
        match relative {
            FfiCaringRelative::Child => CaringRelative::Child,
            FfiCaringRelative::Parent => CaringRelative::Parent,
            FfiCaringRelative::Sibling => CaringRelative::Sibling,
            FfiCaringRelative::Other => CaringRelative::Other,
        }
    }
}

/// All nearest-relative answers at once. Later answers are ignored once an
/// earlier one decides the outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNearestRelativeAnswers {
    pub has_partner: bool,
    pub partner_eligible: bool,
    pub residing_or_caring: Option<FfiCaringRelative>,
    pub children: bool,
    pub parents: bool,
    pub siblings: bool,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWizardOutcome {
    pub result: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiPlacementType {
    Specified,
    Independent,
    Unknown,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCareActPlacement {
    pub care_leaver: bool,
    pub out_of_area: bool,
    pub placement_type: FfiPlacementType,
    pub target_area: String,
    pub self_funder: bool,
    pub has_deputy_or_attorney: bool,
}

impl From<FfiCareActPlacement> for CareActPlacement {
    fn from(placement: FfiCareActPlacement) -> Self {
        CareActPlacement {
            care_leaver: placement.care_leaver,
            out_of_area: placement.out_of_area,
            placement_type: match placement.placement_type {
                FfiPlacementType::Specified => PlacementType::Specified,
                FfiPlacementType::Independent => PlacementType::Independent,
                FfiPlacementType::Unknown => PlacementType::Unknown,
            },
            target_area: placement.target_area,
            self_funder: placement.self_funder,
            has_deputy_or_attorney: placement.has_deputy_or_attorney,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLaOutcome {
    pub s117_authority: String,
    pub care_act_authority: String,
    pub rationale: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProgressStep {
    pub name: String,
    pub met: bool,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProgress {
    pub percent: f64,
    pub steps: Vec<FfiProgressStep>,
}

impl From<Progress> for FfiProgress {
    fn from(progress: Progress) -> Self {
        Self {
            percent: progress.percent,
            steps: progress
                .steps
                .into_iter()
                .map(|s| FfiProgressStep {
                    name: s.name.to_string(),
                    met: s.met,
                })
                .collect(),
        }
    }
}

/// FFI-safe notification. `kind` is one of `success`, `error`, `info`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotification {
    pub message: String,
    pub kind: String,
}

impl From<&Notification> for FfiNotification {
    fn from(notification: &Notification) -> Self {
        let kind = match notification.kind {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        Self {
            message: notification.message.clone(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaseFile {
    pub filename: String,
    pub json: String,
}

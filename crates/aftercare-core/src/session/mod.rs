//! Case session: the single store a front-end drives.
//!
//! Holds the patient record, the needs register, the funding and DoL view
//! settings, and the most recent user notification. Every mutation goes
//! through a method here so wizard outcomes are written back consistently.

use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError, SavedWork, STORAGE_KEY};
use crate::dol::{classify, DolAssessment, DolInputs, SettingType};
use crate::export::{CaseExport, SupportPlan};
use crate::funding::{calculate_split, FundingMethod, FundingSplit, DEFAULT_ICB_SHARE};
use crate::models::{FieldError, FieldValue, NeedCategory, PatientDetails, PatientField};
use crate::needs::{NeedError, NeedsRegister, NewNeed};
use crate::wizards::{CapacityOutcome, IcbOutcome, LaOutcome, NearestRelativeOutcome};

/// How long a notification stays visible.
pub const NOTIFICATION_TTL_SECS: i64 = 5;

const ICB_RATIONALE_HEADER: &str = "--- ICB RATIONALE ---";
const LA_RATIONALE_HEADER: &str = "--- LOCAL AUTHORITY RATIONALE ---";

/// Session errors.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Need(#[from] NeedError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Invalid case file: {0}")]
    CaseFile(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at).num_seconds() >= NOTIFICATION_TTL_SECS
    }
}

/// One step of the completion tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub name: &'static str,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub steps: Vec<ProgressStep>,
    pub percent: f64,
}

impl Progress {
    pub fn completed(&self) -> usize {
        self.steps.iter().filter(|s| s.met).count()
    }
}

#[derive(Debug, Clone)]
pub struct CaseSession {
    details: PatientDetails,
    needs: NeedsRegister,
    icb_share: u8,
    funding_method: FundingMethod,
    dol_setting: SettingType,
    notification: Option<Notification>,
}

impl Default for CaseSession {
    fn default() -> Self {
        Self {
            details: PatientDetails::default(),
            needs: NeedsRegister::new(),
            icb_share: DEFAULT_ICB_SHARE,
            funding_method: FundingMethod::default(),
            dol_setting: SettingType::default(),
            notification: None,
        }
    }
}

impl CaseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &PatientDetails {
        &self.details
    }

    pub fn needs(&self) -> &NeedsRegister {
        &self.needs
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Current notification unless it has expired by `now`.
    pub fn notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notification.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notification = Some(Notification::new(message, kind));
    }

    // ========================================================================
    // Patient record
    // ========================================================================

    pub fn update(&mut self, field: PatientField, value: impl Into<FieldValue>) -> SessionResult<()> {
        self.details.set(field, value.into())?;
        Ok(())
    }

    /// Record a capacity assessment: the DoL capacity flag and the MCA record.
    pub fn apply_capacity(&mut self, outcome: &CapacityOutcome) {
        self.details.dol_capacity = outcome.result;
        self.details.mca_assessment_rationale = outcome.rationale.clone();
    }

    /// Record the nearest relative and append the reasoning to the family
    /// comments.
    pub fn apply_nearest_relative(&mut self, outcome: &NearestRelativeOutcome) {
        self.details.nearest_relative = outcome.result.label().to_string();
        let entry = format!("**NR Legal Identification:** {}", outcome.rationale);
        append_paragraph(&mut self.details.family_comments, &entry);
    }

    pub fn apply_icb_responsibility(&mut self, outcome: &IcbOutcome) {
        self.details.responsible_icb = outcome.result.clone();
        let entry = format!("{ICB_RATIONALE_HEADER}\n{}", outcome.rationale);
        append_paragraph(&mut self.details.responsibility_rationale, &entry);
    }

    /// Records the s.117 authority as the responsible LA. The Care Act
    /// authority is carried in the appended rationale.
    pub fn apply_la_responsibility(&mut self, outcome: &LaOutcome) {
        self.details.responsible_la = outcome.result.s117_authority.clone();
        let entry = format!("{LA_RATIONALE_HEADER}\n{}", outcome.rationale);
        append_paragraph(&mut self.details.responsibility_rationale, &entry);
    }

    // ========================================================================
    // Needs
    // ========================================================================

    /// Admit a need, returning its id. A rejected need raises an error
    /// notification and leaves the register unchanged.
    pub fn add_need(&mut self, need: NewNeed) -> SessionResult<String> {
        match self.needs.add(need) {
            Ok(item) => Ok(item.id.clone()),
            Err(err) => {
                self.notify(err.to_string(), NotificationKind::Error);
                Err(err.into())
            }
        }
    }

    pub fn remove_need(&mut self, id: &str) -> bool {
        self.needs.remove(id)
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    pub fn icb_share(&self) -> u8 {
        self.icb_share
    }

    /// Set the ICB share of s.117 needs; values above 100 are capped.
    pub fn set_icb_share(&mut self, share: u8) {
        self.icb_share = share.min(100);
    }

    pub fn funding_method(&self) -> FundingMethod {
        self.funding_method
    }

    pub fn set_funding_method(&mut self, method: FundingMethod) {
        self.funding_method = method;
    }

    pub fn funding(&self) -> FundingSplit {
        calculate_split(self.needs.items(), self.icb_share, self.funding_method)
    }

    pub fn dol_setting(&self) -> SettingType {
        self.dol_setting
    }

    pub fn set_dol_setting(&mut self, setting: SettingType) {
        self.dol_setting = setting;
    }

    pub fn dol_assessment(&self, today: NaiveDate) -> DolAssessment {
        classify(&DolInputs::from_details(&self.details, self.dol_setting, today))
    }

    pub fn progress(&self) -> Progress {
        let d = &self.details;
        let steps = vec![
            ProgressStep {
                name: "Demographics",
                met: !d.name.is_empty() && !d.mha_section.is_empty(),
            },
            ProgressStep {
                name: "Responsibility",
                met: !d.responsible_la.is_empty() && !d.responsible_icb.is_empty(),
            },
            ProgressStep {
                name: "Needs",
                met: !self.needs.is_empty(),
            },
            ProgressStep {
                name: "Funding",
                met: self.needs.count_in(NeedCategory::S117) > 0,
            },
            ProgressStep {
                name: "Completion",
                met: !d.completed_by.is_empty(),
            },
        ];
        let met = steps.iter().filter(|s| s.met).count();
        let percent = met as f64 / steps.len() as f64 * 100.0;
        Progress { steps, percent }
    }

    pub fn support_plan(&self) -> String {
        SupportPlan::new(&self.details, &self.needs).to_markdown()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn save(&mut self, db: &Database) -> SessionResult<()> {
        let work = SavedWork::snapshot(&self.details, self.needs.items());
        match db.save_work(STORAGE_KEY, &work) {
            Ok(()) => {
                self.notify("Work saved successfully.", NotificationKind::Success);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "save failed");
                self.notify(
                    "Failed to save. Device storage might be full or unavailable.",
                    NotificationKind::Error,
                );
                Err(err.into())
            }
        }
    }

    /// Restore saved work. Returns `Ok(false)` when nothing was saved.
    /// Parts missing from the saved document are left as they are; a
    /// corrupted document changes nothing.
    pub fn load(&mut self, db: &Database) -> SessionResult<bool> {
        let work = match db.load_work(STORAGE_KEY) {
            Ok(Some(work)) => work,
            Ok(None) => {
                self.notify("No saved work found on this device.", NotificationKind::Info);
                return Ok(false);
            }
            Err(err) => {
                self.notify(
                    "Failed to load data. The saved file may be corrupted.",
                    NotificationKind::Error,
                );
                return Err(err.into());
            }
        };

        if let Some(details) = work.patient_details {
            self.details = details;
        }
        if let Some(needs) = work.needs {
            self.needs = NeedsRegister::from_items(needs);
        }
        info!(needs = self.needs.len(), saved_at = %work.saved_at, "work loaded");
        self.notify(
            format!("Work loaded. Last saved: {}", display_timestamp(&work.saved_at)),
            NotificationKind::Success,
        );
        Ok(true)
    }

    /// Export the case. Returns the suggested filename and the JSON document.
    pub fn export_json(&mut self) -> SessionResult<(String, String)> {
        let export = CaseExport::new(&self.details, self.needs.items());
        let json = export.to_json()?;
        let filename = export.filename();
        info!(%filename, needs = self.needs.len(), "case exported");
        self.notify("Case data exported as JSON.", NotificationKind::Success);
        Ok((filename, json))
    }

    /// Replace the case with an exported document. Invalid JSON changes
    /// nothing.
    pub fn import_json(&mut self, json: &str) -> SessionResult<()> {
        let export = match CaseExport::from_json(json) {
            Ok(export) => export,
            Err(err) => {
                warn!(%err, "case import rejected");
                self.notify(
                    "Failed to import data. The file may be corrupted.",
                    NotificationKind::Error,
                );
                return Err(err.into());
            }
        };
        self.details = export.patient_details;
        self.needs = NeedsRegister::from_items(export.needs);
        info!(needs = self.needs.len(), "case imported");
        self.notify("Case data imported.", NotificationKind::Success);
        Ok(())
    }

    /// Clear the record and needs back to initial values.
    pub fn reset(&mut self) {
        self.details = PatientDetails::default();
        self.needs.clear();
        info!("case reset");
        self.notify("All data has been reset.", NotificationKind::Info);
    }
}

fn append_paragraph(target: &mut String, entry: &str) {
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(entry);
}

fn display_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Local).format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NeedDomain, Severity};
    use crate::wizards::{
        assess_capacity, determine_icb, determine_la, determine_nearest_relative,
        CareActPlacement, FunctionalTest, RelativesPresent, WizardOutcome,
    };

    fn s117_need() -> NewNeed {
        NewNeed {
            description: "Medication management".into(),
            intervention: "Daily prompts".into(),
            domain: NeedDomain::MentalHealth,
            severity: Severity::High,
            statutory_test_arises: true,
            statutory_test_reduces_risk: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_update_field() {
        let mut session = CaseSession::new();
        session.update(PatientField::Name, "Jane Doe").unwrap();
        session.update(PatientField::IsRestricted, true).unwrap();
        assert_eq!(session.details().name, "Jane Doe");
        assert!(session.details().is_restricted);

        assert!(session.update(PatientField::IsRestricted, "yes").is_err());
    }

    #[test]
    fn test_rejected_need_notifies() {
        let mut session = CaseSession::new();
        let need = NewNeed {
            statutory_test_arises: false,
            ..s117_need()
        };
        assert!(matches!(
            session.add_need(need),
            Err(SessionError::Need(NeedError::StatutoryTestsUnmet))
        ));
        assert!(session.needs().is_empty());
        let note = session.notification(Utc::now()).unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
    }

    #[test]
    fn test_remove_need() {
        let mut session = CaseSession::new();
        let id = session.add_need(s117_need()).unwrap();
        assert!(session.remove_need(&id));
        assert!(session.needs().is_empty());
    }

    #[test]
    fn test_notification_expires() {
        let note = Notification::new("hello", NotificationKind::Info);
        assert!(!note.is_expired(note.created_at));
        assert!(!note.is_expired(note.created_at + chrono::Duration::seconds(4)));
        assert!(note.is_expired(note.created_at + chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_apply_capacity() {
        let mut session = CaseSession::new();
        let functional = FunctionalTest {
            understand: true,
            retain: true,
            use_information: true,
            weigh: false,
            communicate: true,
        };
        let outcome = assess_capacity("Where to live", functional, Some(true));
        session.apply_capacity(&outcome);
        assert!(session.details().dol_capacity);
        assert_eq!(session.details().mca_assessment_rationale, outcome.rationale);
    }

    #[test]
    fn test_apply_nearest_relative_appends_comments() {
        let mut session = CaseSession::new();
        session
            .update(PatientField::FamilyComments, "Sister visits weekly.")
            .unwrap();
        let result = determine_nearest_relative(false, None, RelativesPresent::default());
        let outcome = WizardOutcome {
            result,
            rationale: result.rationale().to_string(),
        };
        session.apply_nearest_relative(&outcome);

        let details = session.details();
        assert_eq!(details.nearest_relative, result.label());
        assert!(details
            .family_comments
            .starts_with("Sister visits weekly.\n\n**NR Legal Identification:** "));
    }

    #[test]
    fn test_responsibility_rationale_sections() {
        let mut session = CaseSession::new();
        session.apply_icb_responsibility(&determine_icb("GM ICB", false));
        session.apply_la_responsibility(&determine_la(
            "Manchester City Council",
            false,
            &CareActPlacement::default(),
        ));

        let details = session.details();
        assert_eq!(details.responsible_icb, "GM ICB");
        assert_eq!(details.responsible_la, "Manchester City Council");
        assert!(details
            .responsibility_rationale
            .starts_with("--- ICB RATIONALE ---\n"));
        assert!(details
            .responsibility_rationale
            .contains("\n\n--- LOCAL AUTHORITY RATIONALE ---\n"));
    }

    #[test]
    fn test_progress_steps() {
        let mut session = CaseSession::new();
        assert_eq!(session.progress().percent, 0.0);

        session.update(PatientField::Name, "Jane Doe").unwrap();
        session.update(PatientField::MhaSection, "s3").unwrap();
        session.add_need(s117_need()).unwrap();
        let progress = session.progress();
        assert_eq!(progress.completed(), 3);
        assert_eq!(progress.percent, 60.0);
    }

    #[test]
    fn test_funding_uses_session_settings() {
        let mut session = CaseSession::new();
        session.add_need(s117_need()).unwrap();
        session.set_icb_share(200);
        assert_eq!(session.icb_share(), 100);
        assert_eq!(session.funding().icb_percentage, 100.0);

        session.set_funding_method(FundingMethod::Count);
        assert_eq!(session.funding().total_score, 1.0);
    }

    #[test]
    fn test_load_without_saved_work() {
        let db = Database::open_in_memory().unwrap();
        let mut session = CaseSession::new();
        assert!(!session.load(&db).unwrap());
        let note = session.notification(Utc::now()).unwrap();
        assert_eq!(note.message, "No saved work found on this device.");
        assert_eq!(note.kind, NotificationKind::Info);
    }

    #[test]
    fn test_save_then_load() {
        let db = Database::open_in_memory().unwrap();
        let mut session = CaseSession::new();
        session.update(PatientField::Name, "Jane Doe").unwrap();
        session.add_need(s117_need()).unwrap();
        session.save(&db).unwrap();

        let mut restored = CaseSession::new();
        assert!(restored.load(&db).unwrap());
        assert_eq!(restored.details(), session.details());
        assert_eq!(restored.needs(), session.needs());
        let note = restored.notification(Utc::now()).unwrap();
        assert!(note.message.starts_with("Work loaded. Last saved: "));
    }

    #[test]
    fn test_import_invalid_leaves_state() {
        let mut session = CaseSession::new();
        session.update(PatientField::Name, "Jane Doe").unwrap();
        assert!(session.import_json("{ broken").is_err());
        assert_eq!(session.details().name, "Jane Doe");
    }

    #[test]
    fn test_reset() {
        let mut session = CaseSession::new();
        session.update(PatientField::Name, "Jane Doe").unwrap();
        session.add_need(s117_need()).unwrap();
        session.reset();
        assert_eq!(session.details(), &PatientDetails::default());
        assert!(session.needs().is_empty());
        assert_eq!(
            session.notification(Utc::now()).unwrap().message,
            "All data has been reset."
        );
    }
}

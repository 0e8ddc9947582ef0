//! Saved work and case file integration tests.

use aftercare_core::db::{Database, STORAGE_KEY};
use aftercare_core::models::{NeedCategory, NeedDomain, PatientField, Severity};
use aftercare_core::needs::NewNeed;
use aftercare_core::session::{CaseSession, NotificationKind};
use chrono::Utc;
use tempfile::TempDir;

fn populated_session() -> CaseSession {
    let mut session = CaseSession::new();
    session.update(PatientField::Name, "Sam Patel").unwrap();
    session.update(PatientField::MhaSection, "s3").unwrap();
    session.update(PatientField::IsRestricted, true).unwrap();

    let mut need = NewNeed::new(NeedCategory::S117);
    need.description = "Risk of relapse without medication oversight".to_string();
    need.domain = NeedDomain::MentalHealth;
    need.intervention = "Weekly CPN depot clinic".to_string();
    need.severity = Severity::High;
    need.statutory_test_arises = true;
    need.statutory_test_reduces_risk = true;
    session.add_need(need).unwrap();
    session
}

#[test]
fn test_save_and_reload_across_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("work.db");

    {
        let db = Database::open(&path).unwrap();
        let mut session = populated_session();
        session.save(&db).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let mut session = CaseSession::new();
    assert!(session.load(&db).unwrap());
    assert_eq!(session.details().name, "Sam Patel");
    assert!(session.details().is_restricted);
    assert_eq!(session.needs().len(), 1);

    let notification = session.notification(Utc::now()).unwrap();
    assert_eq!(notification.kind, NotificationKind::Success);
    assert!(notification.message.starts_with("Work loaded. Last saved: "));
}

#[test]
fn test_load_with_nothing_saved() {
    let db = Database::open_in_memory().unwrap();
    let mut session = populated_session();
    assert!(!session.load(&db).unwrap());
    assert_eq!(session.details().name, "Sam Patel");
    assert_eq!(
        session.notification(Utc::now()).unwrap().message,
        "No saved work found on this device."
    );
}

#[test]
fn test_corrupted_save_leaves_case_untouched() {
    let db = Database::open_in_memory().unwrap();
    populated_session().save(&db).unwrap();
    db.conn()
        .execute(
            "UPDATE saved_work SET value = '{not json' WHERE key = ?1",
            [STORAGE_KEY],
        )
        .unwrap();

    let mut session = CaseSession::new();
    session.update(PatientField::Name, "Unsaved").unwrap();
    assert!(session.load(&db).is_err());
    assert_eq!(session.details().name, "Unsaved");
    assert!(session.needs().is_empty());

    let notification = session.notification(Utc::now()).unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
}

#[test]
fn test_export_then_import() {
    let mut original = populated_session();
    let (filename, json) = original.export_json().unwrap();
    assert_eq!(filename, "S117_Assessment_Sam Patel.json");

    let mut restored = CaseSession::new();
    restored.import_json(&json).unwrap();
    assert_eq!(restored.details(), original.details());
    assert_eq!(restored.needs().items(), original.needs().items());
    assert_eq!(restored.support_plan(), original.support_plan());
}

#[test]
fn test_import_garbage_keeps_case() {
    let mut session = populated_session();
    assert!(session.import_json("not json at all").is_err());
    assert_eq!(session.needs().len(), 1);
    assert_eq!(
        session.notification(Utc::now()).unwrap().message,
        "Failed to import data. The file may be corrupted."
    );
}

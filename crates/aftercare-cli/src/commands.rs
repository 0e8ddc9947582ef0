//! Subcommand implementations. Each returns the text to print.

use std::fs;
use std::path::Path;

use aftercare_core::dol::{DolStatus, SettingType};
use aftercare_core::{CaseSession, Database, FundingMethod};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Read a case file into a fresh session.
fn open_case(path: &Path) -> Result<CaseSession> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let mut session = CaseSession::new();
    session
        .import_json(&json)
        .with_context(|| format!("Failed to parse case file: {}", path.display()))?;
    info!(path = %path.display(), needs = session.needs().len(), "case file opened");
    Ok(session)
}

pub fn write_file(path: &Path, contents: &str) -> Result<String> {
    fs::write(path, contents).with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(format!("Wrote {}", path.display()))
}

pub fn funding(case: &Path, icb_share: u8, method: FundingMethod, json: bool) -> Result<String> {
    if icb_share > 100 {
        bail!("ICB share must be between 0 and 100, got {icb_share}");
    }
    let mut session = open_case(case)?;
    session.set_icb_share(icb_share);
    session.set_funding_method(method);
    let split = session.funding();

    if json {
        return serde_json::to_string_pretty(&split).context("Failed to serialize funding split");
    }

    let (icb, la) = split.display_percentages();
    let mut out = String::new();
    out.push_str(&format!(
        "ICB (NHS):        {icb:>5.1}%  (score {:.1})\n",
        split.icb_score
    ));
    out.push_str(&format!(
        "Local Authority:  {la:>5.1}%  (score {:.1})\n",
        split.la_score
    ));
    out.push_str(&format!(
        "s.117: {:.1} | Care Act: {:.1} | Physical Health: {:.1} (ICB share of s.117: {}%)",
        split.s117_score,
        split.care_act_score,
        split.physical_health_score,
        session.icb_share()
    ));
    Ok(out)
}

pub fn plan(case: &Path) -> Result<String> {
    Ok(open_case(case)?.support_plan())
}

pub fn dol(case: &Path, setting: SettingType, today: NaiveDate) -> Result<String> {
    let mut session = open_case(case)?;
    session.set_dol_setting(setting);
    let assessment = session.dol_assessment(today);
    let status = match assessment.status {
        DolStatus::Ok => "OK",
        DolStatus::Warning => "WARNING",
        DolStatus::Critical => "CRITICAL",
    };
    let mut out = format!("[{status}] {}\n\n{}", assessment.message, assessment.recommendation);
    if assessment.setting_applies {
        let other = match setting {
            SettingType::Institutional => "community",
            SettingType::Community => "institutional",
        };
        out.push_str(&format!("\n\nSetting matters here; compare with --setting {other}."));
    }
    Ok(out)
}

pub fn progress(case: &Path) -> Result<String> {
    let progress = open_case(case)?.progress();
    let mut out = format!("{:.0}% complete\n", progress.percent);
    for step in &progress.steps {
        let mark = if step.met { "x" } else { " " };
        out.push_str(&format!("[{mark}] {}\n", step.name));
    }
    Ok(out.trim_end().to_string())
}

pub fn save(db_path: &Path, case: &Path) -> Result<String> {
    let mut session = open_case(case)?;
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    session.save(&db).context("Failed to save work")?;
    Ok(format!("Saved {} to {}", case.display(), db_path.display()))
}

/// Returns the suggested filename and the exported JSON.
pub fn load(db_path: &Path) -> Result<(String, String)> {
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let mut session = CaseSession::new();
    if !session.load(&db).context("Failed to load saved work")? {
        bail!("No saved work found in {}", db_path.display());
    }
    session.export_json().context("Failed to export case")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aftercare_core::export::CaseExport;
    use aftercare_core::{NeedCategory, NeedItem, NeedDomain, PatientDetails, Severity};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn need(category: NeedCategory, severity: Severity) -> NeedItem {
        NeedItem {
            id: format!("{category:?}-{severity:?}"),
            description: "need".into(),
            category,
            domain: NeedDomain::MentalHealth,
            intervention: "intervention".into(),
            provider: "NHS".into(),
            severity,
            statutory_test_arises: Some(true),
            statutory_test_reduces_risk: Some(true),
        }
    }

    fn write_case(dir: &TempDir) -> PathBuf {
        let mut details = PatientDetails::default();
        details.name = "Jane Doe".into();
        details.mha_section = "s3".into();
        details.dob = "1980-02-01".into();
        details.dol_supervision = true;
        details.dol_free_to_leave = false;
        details.dol_capacity = true;
        let needs = vec![
            need(NeedCategory::S117, Severity::High),
            need(NeedCategory::S117, Severity::Low),
            need(NeedCategory::CareAct, Severity::Medium),
        ];
        let path = dir.path().join("case.json");
        let json = CaseExport::new(&details, &needs).to_json().unwrap();
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_funding_output() {
        let dir = TempDir::new().unwrap();
        let case = write_case(&dir);

        let out = funding(&case, 50, FundingMethod::Weighted, false).unwrap();
        assert!(out.contains(" 33.3%"));
        assert!(out.contains(" 66.7%"));

        assert!(funding(&case, 101, FundingMethod::Weighted, false).is_err());
    }

    #[test]
    fn test_dol_output() {
        let dir = TempDir::new().unwrap();
        let case = write_case(&dir);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let out = dol(&case, SettingType::Community, today).unwrap();
        assert!(out.starts_with("[WARNING] Court of Protection Order Required."));
        assert!(out.ends_with("compare with --setting institutional."));
    }

    #[test]
    fn test_progress_output() {
        let dir = TempDir::new().unwrap();
        let case = write_case(&dir);
        let out = progress(&case).unwrap();
        assert!(out.starts_with("60% complete"));
        assert!(out.contains("[x] Demographics"));
        assert!(out.contains("[ ] Responsibility"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let case = write_case(&dir);
        let db = dir.path().join("aftercare.db");

        assert!(load(&db).is_err());
        save(&db, &case).unwrap();
        let (filename, json) = load(&db).unwrap();
        assert_eq!(filename, "S117_Assessment_Jane Doe.json");
        let restored = CaseExport::from_json(&json).unwrap();
        assert_eq!(restored.needs.len(), 3);
    }

    #[test]
    fn test_missing_case_file() {
        let dir = TempDir::new().unwrap();
        assert!(plan(&dir.path().join("absent.json")).is_err());
    }
}

//! Printable support plan.
//!
//! A read-only projection of the case record and needs register rendered as
//! Markdown. Printing or conversion to PDF is left to the host.

use crate::models::{find_mha_section, NeedCategory, PatientDetails};
use crate::needs::NeedsRegister;

const NO_NHS_REF: &str = "NO-NHS-REF";
const NO_LIMB2_EVIDENCE: &str =
    "WARNING: No professional evidence provided for readmission prevention.";
const NO_NEEDS: &str = "No assessed needs found in identification module.";
const DEPRIVATION_FLAG: &str = "Acid Test Met: DoLS Authorisation / Court Order Required.";
const FOOTER: &str = "Generated via s.117 After-care Decision Support. This document is a formal assessment under the MHA 1983 and Care Act 2014. All funding allocations are indicative based on the identified legal character of needs.";

/// Support plan view over a case.
pub struct SupportPlan<'a> {
    details: &'a PatientDetails,
    needs: &'a NeedsRegister,
}

impl<'a> SupportPlan<'a> {
    pub fn new(details: &'a PatientDetails, needs: &'a NeedsRegister) -> Self {
        Self { details, needs }
    }

    pub fn reference(&self) -> &str {
        if self.details.nhs_number.is_empty() {
            NO_NHS_REF
        } else {
            &self.details.nhs_number
        }
    }

    /// s.117 entitlement line from the recorded MHA section.
    pub fn entitlement(&self) -> String {
        let section = find_mha_section(&self.details.mha_section);
        let label = section.map_or("Unknown", |s| s.label);
        if section.is_some_and(|s| s.eligible) {
            format!("Entitled (Detention: {label})")
        } else {
            format!("Not entitled (Detention: {label})")
        }
    }

    pub fn capacity_findings(&self) -> &str {
        if !self.details.mca_assessment_rationale.is_empty() {
            &self.details.mca_assessment_rationale
        } else if self.details.dol_capacity {
            "Assessed as lacking capacity for residence/care decisions."
        } else {
            "Presumed to have capacity for relevant decisions."
        }
    }

    /// Deprivation warning, present only when the acid test is met.
    pub fn deprivation_flag(&self) -> Option<&'static str> {
        self.details.meets_acid_test().then_some(DEPRIVATION_FLAG)
    }

    /// Limb 2 evidence text, or `None` when there are no s.117 needs to
    /// justify.
    pub fn limb2_evidence(&self) -> Option<&str> {
        if self.needs.count_in(NeedCategory::S117) == 0 {
            return None;
        }
        if self.details.s117_limb2_evidence.is_empty() {
            Some(NO_LIMB2_EVIDENCE)
        } else {
            Some(&self.details.s117_limb2_evidence)
        }
    }

    pub fn to_markdown(&self) -> String {
        let d = self.details;
        let mut md = String::new();

        md.push_str("# Statutory Support Plan\n\n");
        md.push_str(&format!(
            "**Version:** {} | **Ref:** {}\n\n",
            d.version,
            self.reference()
        ));

        section(&mut md, "Demographic Information");
        table(
            &mut md,
            &[
                ("Full Name", d.name.as_str()),
                ("MHA Status", d.mha_section.as_str()),
                ("NHS Number", d.nhs_number.as_str()),
                ("DOB", d.dob.as_str()),
                ("Diagnoses", d.diagnoses.as_str()),
                ("Responsible LA", d.responsible_la.as_str()),
                ("Responsible ICB", d.responsible_icb.as_str()),
                ("Nearest Relative (s.26)", d.nearest_relative.as_str()),
            ],
        );

        section(&mut md, "Legal Basis Summary");
        let entitlement = self.entitlement();
        let mut legal = vec![
            ("s.117 Entitlement", entitlement.as_str()),
            ("Responsible LA", d.responsible_la.as_str()),
            ("Responsible ICB", d.responsible_icb.as_str()),
        ];
        if !d.responsibility_rationale.is_empty() {
            legal.push(("Responsibility Rationale", d.responsibility_rationale.as_str()));
        }
        table(&mut md, &legal);

        section(&mut md, "Statutory Safeguards & Advocacy");
        let imha = if d.imha_referral_done {
            "COMPLETED (s.130A compliant)"
        } else {
            "NOT COMPLETED / NA"
        };
        let imca = if d.imca_referral_done {
            "COMPLETED (MCA compliant)"
        } else {
            "NOT COMPLETED / NA"
        };
        let mut safeguards = vec![
            ("IMHA Referral", imha),
            ("IMCA Referral", imca),
            ("Mental Capacity Findings", self.capacity_findings()),
        ];
        if let Some(flag) = self.deprivation_flag() {
            safeguards.push(("Deprivation of Liberty", flag));
        }
        table(&mut md, &safeguards);

        if let Some(evidence) = self.limb2_evidence() {
            section(&mut md, "s.117(6) Statutory Purpose Evidence");
            md.push_str("**PROFESSIONAL DEFENSE OF LIMB 2:**\n\n");
            for line in evidence.lines() {
                md.push_str(&format!("> {line}\n"));
            }
            md.push('\n');
        }

        section(&mut md, "Assessed Needs & Interventions");
        md.push_str(&format!(
            "s.117 After-care: **{}** | Care Act: **{}** | Physical Health (NHS): **{}**\n\n",
            self.needs.count_in(NeedCategory::S117),
            self.needs.count_in(NeedCategory::CareAct),
            self.needs.count_in(NeedCategory::PhysicalHealth),
        ));
        let groups = self.needs.by_domain();
        if groups.is_empty() {
            md.push_str(&format!("*{NO_NEEDS}*\n\n"));
        }
        for (domain, needs) in groups {
            md.push_str(&format!("### {}\n\n", domain.label()));
            md.push_str("| Need | Category | Intervention | Provider | Funding |\n");
            md.push_str("|---|---|---|---|---|\n");
            for need in needs {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    cell(&need.description),
                    need.category.label(),
                    cell(&need.intervention),
                    cell(&need.provider),
                    need.category.funding_source(),
                ));
            }
            md.push('\n');
        }

        section(&mut md, "Authorization & Review");
        let confidence = format!("{}%", d.decision_confidence);
        let mut review = vec![
            ("Completed By", d.completed_by.as_str()),
            ("Professional Designation", d.designation.as_str()),
            ("Completion Date", d.completion_date.as_str()),
            ("Next Review Due", d.next_review_date.as_str()),
            ("Case Status", d.case_status.label()),
            ("Decision Confidence", confidence.as_str()),
        ];
        if !d.decision_confidence_notes.is_empty() {
            review.push(("Decision Confidence Notes", d.decision_confidence_notes.as_str()));
        }
        table(&mut md, &review);

        md.push_str("---\n\n");
        md.push_str(&format!("*{FOOTER}*\n"));
        md
    }
}

fn section(md: &mut String, title: &str) {
    md.push_str(&format!("## {title}\n\n"));
}

fn table(md: &mut String, rows: &[(&str, &str)]) {
    md.push_str("| Field | Value |\n|---|---|\n");
    for (label, value) in rows {
        md.push_str(&format!("| {} | {} |\n", label, cell(value)));
    }
    md.push('\n');
}

// Table cells are single-line.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NeedDomain, Severity};
    use crate::needs::NewNeed;

    fn s117_need(domain: NeedDomain, description: &str) -> NewNeed {
        NewNeed {
            description: description.into(),
            intervention: "Support worker".into(),
            domain,
            severity: Severity::High,
            statutory_test_arises: true,
            statutory_test_reduces_risk: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_case_plan() {
        let details = PatientDetails::default();
        let needs = NeedsRegister::new();
        let plan = SupportPlan::new(&details, &needs);

        let md = plan.to_markdown();
        assert!(md.contains("**Ref:** NO-NHS-REF"));
        assert!(md.contains("Not entitled (Detention: Unknown)"));
        assert!(md.contains("Presumed to have capacity for relevant decisions."));
        assert!(md.contains(NO_NEEDS));
        assert!(!md.contains("Statutory Purpose Evidence"));
        assert!(!md.contains(DEPRIVATION_FLAG));
    }

    #[test]
    fn test_entitlement_from_section() {
        let mut details = PatientDetails::default();
        let needs = NeedsRegister::new();

        details.mha_section = "s3".into();
        let entitled = SupportPlan::new(&details, &needs).entitlement();
        assert_eq!(entitled, "Entitled (Detention: Section 3 (Treatment))");

        details.mha_section = "s2".into();
        let not_entitled = SupportPlan::new(&details, &needs).entitlement();
        assert_eq!(not_entitled, "Not entitled (Detention: Section 2 (Assessment))");
    }

    #[test]
    fn test_limb2_warning_when_evidence_missing() {
        let details = PatientDetails::default();
        let mut needs = NeedsRegister::new();
        needs
            .add(s117_need(NeedDomain::MentalHealth, "Medication"))
            .unwrap();

        let plan = SupportPlan::new(&details, &needs);
        assert_eq!(plan.limb2_evidence(), Some(NO_LIMB2_EVIDENCE));
        assert!(plan.to_markdown().contains("> WARNING: No professional evidence"));
    }

    #[test]
    fn test_deprivation_and_capacity_findings() {
        let mut details = PatientDetails::default();
        details.dol_supervision = true;
        details.dol_free_to_leave = false;
        details.dol_capacity = true;
        let needs = NeedsRegister::new();

        let plan = SupportPlan::new(&details, &needs);
        assert_eq!(plan.deprivation_flag(), Some(DEPRIVATION_FLAG));
        assert_eq!(
            plan.capacity_findings(),
            "Assessed as lacking capacity for residence/care decisions."
        );

        details.mca_assessment_rationale = "Lacks capacity.\nUnable to weigh.".into();
        let md = SupportPlan::new(&details, &needs).to_markdown();
        assert!(md.contains("| Mental Capacity Findings | Lacks capacity.<br>Unable to weigh. |"));
    }

    #[test]
    fn test_needs_grouped_with_funding_source() {
        let mut details = PatientDetails::default();
        details.nhs_number = "943 476 5919".into();
        details.decision_confidence = 85;
        let mut needs = NeedsRegister::new();
        needs
            .add(s117_need(NeedDomain::Crisis, "Crisis plan"))
            .unwrap();
        needs
            .add(NewNeed {
                description: "Wound care".into(),
                intervention: "District nurse".into(),
                category: NeedCategory::PhysicalHealth,
                domain: NeedDomain::PhysicalHealth,
                ..Default::default()
            })
            .unwrap();

        let md = SupportPlan::new(&details, &needs).to_markdown();
        assert!(md.contains("**Ref:** 943 476 5919"));
        assert!(md.contains("s.117 After-care: **1** | Care Act: **0** | Physical Health (NHS): **1**"));
        assert!(md.contains("| Wound care | Physical Health (NHS) | District nurse |  | ICB (NHS) |"));
        assert!(md.contains("| Decision Confidence | 85% |"));

        let physical = md.find(NeedDomain::PhysicalHealth.label()).unwrap();
        let crisis = md.find(NeedDomain::Crisis.label()).unwrap();
        assert!(physical < crisis);
    }
}

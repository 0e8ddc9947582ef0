//! Care Act 2014 eligibility wording for non-s.117 social care needs.

/// The eligibility outcomes from the Care and Support (Eligibility
/// Criteria) Regulations 2014.
pub const CARE_ACT_OUTCOMES: [&str; 10] = [
    "Managing and maintaining nutrition",
    "Maintaining personal hygiene",
    "Managing toilet needs",
    "Being appropriately clothed",
    "Being able to make use of the home safely",
    "Maintaining a habitable home environment",
    "Developing and maintaining family or other personal relationships",
    "Accessing and engaging in work, training, education or volunteering",
    "Making use of necessary facilities or services in the local community",
    "Carrying out any caring responsibilities the adult has for a child",
];

/// Ways a person can be "unable to achieve" an outcome.
pub const UNABLE_TO_ACHIEVE_CRITERIA: [&str; 4] = [
    "Is unable to achieve it without assistance",
    "Is able to achieve it without assistance but doing so causes significant pain, distress or anxiety",
    "Is able to achieve it without assistance but endangers the health or safety of the adult or others",
    "Is able to achieve it without assistance but takes significantly longer than would normally be expected",
];

/// Outcomes selected on the Care Act checklist, each with the reason it
/// cannot be achieved (indexes into the two tables above).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CareActChecklist {
    selections: Vec<(usize, usize)>,
    pub significant_impact: bool,
}

impl CareActChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect an outcome. Newly selected outcomes start with the
    /// first criterion. Out-of-range indexes are ignored.
    pub fn toggle_outcome(&mut self, outcome: usize) {
        if outcome >= CARE_ACT_OUTCOMES.len() {
            return;
        }
        if let Some(pos) = self.selections.iter().position(|(o, _)| *o == outcome) {
            self.selections.remove(pos);
        } else {
            self.selections.push((outcome, 0));
        }
    }

    /// Select an outcome with a reason. Selecting it again only updates the
    /// reason. Out-of-range indexes are ignored.
    pub fn select_outcome(&mut self, outcome: usize, criterion: usize) {
        if outcome >= CARE_ACT_OUTCOMES.len() {
            return;
        }
        if !self.selections.iter().any(|(o, _)| *o == outcome) {
            self.selections.push((outcome, 0));
        }
        self.set_reason(outcome, criterion);
    }

    /// Change the reason for an already-selected outcome.
    pub fn set_reason(&mut self, outcome: usize, criterion: usize) {
        if criterion >= UNABLE_TO_ACHIEVE_CRITERIA.len() {
            return;
        }
        if let Some(entry) = self.selections.iter_mut().find(|(o, _)| *o == outcome) {
            entry.1 = criterion;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selections.len()
    }

    /// Need description summarising the checklist, or `None` when nothing
    /// is selected.
    pub fn describe(&self) -> Option<String> {
        if self.selections.is_empty() {
            return None;
        }
        let mut desc = format!(
            "[Care Act Eligible] Unable to achieve {} outcome(s):\n",
            self.selections.len()
        );
        for (index, (outcome, criterion)) in self.selections.iter().enumerate() {
            desc.push_str(&format!(
                "{}. {} - {}\n",
                index + 1,
                CARE_ACT_OUTCOMES[*outcome],
                UNABLE_TO_ACHIEVE_CRITERIA[*criterion]
            ));
        }
        if self.significant_impact {
            desc.push_str("\nSignificant impact on wellbeing confirmed.");
        }
        Some(desc.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_checklist_has_no_description() {
        assert_eq!(CareActChecklist::new().describe(), None);
    }

    #[test]
    fn test_description_lists_selected_outcomes() {
        let mut checklist = CareActChecklist::new();
        checklist.toggle_outcome(0);
        checklist.toggle_outcome(5);
        checklist.set_reason(5, 2);
        checklist.significant_impact = true;

        let desc = checklist.describe().unwrap();
        assert!(desc.starts_with("[Care Act Eligible] Unable to achieve 2 outcome(s):"));
        assert!(desc.contains(
            "1. Managing and maintaining nutrition - Is unable to achieve it without assistance"
        ));
        assert!(desc.contains("2. Maintaining a habitable home environment - Is able to achieve it without assistance but endangers"));
        assert!(desc.ends_with("Significant impact on wellbeing confirmed."));
    }

    #[test]
    fn test_toggle_removes_selection() {
        let mut checklist = CareActChecklist::new();
        checklist.toggle_outcome(3);
        checklist.toggle_outcome(3);
        checklist.toggle_outcome(42);
        assert_eq!(checklist.selected_count(), 0);
    }

    #[test]
    fn test_select_twice_keeps_selection() {
        let mut checklist = CareActChecklist::new();
        checklist.select_outcome(2, 1);
        checklist.select_outcome(2, 3);
        checklist.select_outcome(11, 0);
        assert_eq!(checklist.selected_count(), 1);
        assert!(checklist
            .describe()
            .unwrap()
            .contains("1. Managing toilet needs - Is able to achieve it without assistance but takes"));
    }
}

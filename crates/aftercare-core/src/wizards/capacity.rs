//! MCA 2005 s.3 capacity assessment.
//!
//! DefineDecision → FunctionalTest → ImpairmentTest → Complete. The
//! impairment (causative nexus) step is only reached when at least one
//! functional stage fails.

use tracing::debug;

use super::{require_text, yes_no, WizardError, WizardOutcome, WizardResult};

/// Decision assessed when the caseworker does not change it.
pub const DEFAULT_DECISION: &str = "Where to live upon discharge and the care arrangements there.";

/// The five functional-test stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionalTest {
    pub understand: bool,
    pub retain: bool,
    pub use_information: bool,
    pub weigh: bool,
    pub communicate: bool,
}

impl FunctionalTest {
    /// True when every stage was met.
    pub fn all_met(&self) -> bool {
        self.understand && self.retain && self.use_information && self.weigh && self.communicate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityStep {
    DefineDecision,
    FunctionalTest,
    ImpairmentTest,
    Complete,
}

/// Outcome result: `true` when the person lacks capacity for the decision.
pub type CapacityOutcome = WizardOutcome<bool>;

#[derive(Debug, Clone)]
pub struct CapacityWizard {
    step: CapacityStep,
    decision: String,
    functional: Option<FunctionalTest>,
}

impl Default for CapacityWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CapacityWizard {
    pub fn new() -> Self {
        Self {
            step: CapacityStep::DefineDecision,
            decision: DEFAULT_DECISION.to_string(),
            functional: None,
        }
    }

    pub fn step(&self) -> CapacityStep {
        self.step
    }

    pub fn decision(&self) -> &str {
        &self.decision
    }

    /// Step 1: confirm the (decision-specific) question being assessed.
    pub fn define_decision(&mut self, decision: &str) -> WizardResult<()> {
        self.expect(CapacityStep::DefineDecision, "define the decision")?;
        self.decision = require_text(decision, "decision")?;
        self.step = CapacityStep::FunctionalTest;
        Ok(())
    }

    /// Step 2: record the functional test.
    ///
    /// Returns the outcome straight away when every stage is met, since the
    /// presumption of capacity then stands.
    pub fn submit_functional_test(
        &mut self,
        answers: FunctionalTest,
    ) -> WizardResult<Option<CapacityOutcome>> {
        self.expect(CapacityStep::FunctionalTest, "submit the functional test")?;
        self.functional = Some(answers);
        if answers.all_met() {
            self.step = CapacityStep::Complete;
            return Ok(Some(assess_capacity(&self.decision, answers, None)));
        }
        self.step = CapacityStep::ImpairmentTest;
        Ok(None)
    }

    /// Step 3: is the inability caused by an impairment of the mind or brain?
    pub fn submit_impairment(&mut self, impairment: bool) -> WizardResult<CapacityOutcome> {
        self.expect(CapacityStep::ImpairmentTest, "submit the impairment test")?;
        let functional = self
            .functional
            .ok_or(WizardError::MissingAnswer("functional test"))?;
        self.step = CapacityStep::Complete;
        Ok(assess_capacity(&self.decision, functional, Some(impairment)))
    }

    fn expect(&self, step: CapacityStep, action: &'static str) -> WizardResult<()> {
        if self.step != step {
            return Err(WizardError::InvalidStep {
                action,
                step: format!("{:?}", self.step),
            });
        }
        Ok(())
    }
}

/// Decide capacity and build the assessment record.
///
/// A person lacks capacity only when a functional stage fails *and* the
/// failure is caused by an impairment. `impairment` is ignored when all
/// functional stages are met.
pub fn assess_capacity(
    decision: &str,
    functional: FunctionalTest,
    impairment: Option<bool>,
) -> CapacityOutcome {
    let functional_failure = !functional.all_met();
    let impaired = impairment == Some(true);
    let lacks_capacity = functional_failure && impaired;

    let mut rationale = String::from("MCA 2005 s.3 CAPACITY ASSESSMENT\n");
    rationale.push_str(&format!("DECISION: {decision}\n\n"));
    rationale.push_str("1. FUNCTIONAL TEST (5 Stages):\n");
    rationale.push_str(&format!(
        "- Able to understand relevant info: {}\n",
        yes_no(functional.understand)
    ));
    rationale.push_str(&format!("- Able to retain info: {}\n", yes_no(functional.retain)));
    rationale.push_str(&format!(
        "- Able to use info: {}\n",
        yes_no(functional.use_information)
    ));
    rationale.push_str(&format!("- Able to weigh info: {}\n", yes_no(functional.weigh)));
    rationale.push_str(&format!(
        "- Able to communicate decision: {}\n\n",
        yes_no(functional.communicate)
    ));

    if functional_failure {
        rationale.push_str("2. MENTAL IMPAIRMENT TEST (Causative Nexus):\n");
        rationale.push_str(&format!(
            "Is this inability because of an impairment of, or a disturbance in the functioning of, the mind or brain? {}\n\n",
            yes_no(impaired)
        ));
        if lacks_capacity {
            rationale.push_str("CONCLUSION: The person lacks capacity to make this decision. The functional inability is caused by an impairment/disturbance of the mind or brain.");
        } else {
            rationale.push_str("CONCLUSION: The person has capacity. Although a functional inability was noted, it was not established that this was caused by a mental impairment (causative nexus not met).");
        }
    } else {
        rationale.push_str("CONCLUSION: The person has capacity. All functional stages were met. The presumption of capacity remains.");
    }

    debug!(lacks_capacity, functional_failure, "capacity assessed");

    WizardOutcome {
        result: lacks_capacity,
        rationale,
    }
}

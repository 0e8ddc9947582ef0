//! MHA 1983 s.26 nearest relative identification.
//!
//! Priority: eligible spouse/partner, then a relative the patient resides
//! with or is cared for by (s.26(4)), then the standard hierarchy. The
//! hierarchy resolves to a relative type only; it does not pick between
//! siblings or children.

use tracing::debug;

use super::{WizardError, WizardOutcome, WizardResult};

/// Type of relative the patient ordinarily resides with or is cared for by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaringRelative {
    Child,
    Parent,
    Sibling,
    Other,
}

/// Which hierarchy categories have a living relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelativesPresent {
    pub children: bool,
    pub parents: bool,
    pub siblings: bool,
}

/// The identified nearest relative type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestRelative {
    SpouseOrPartner,
    Residing(CaringRelative),
    EldestChild,
    EldestParent,
    EldestSibling,
    OtherRelative,
}

impl NearestRelative {
    pub fn label(&self) -> &'static str {
        match self {
            NearestRelative::SpouseOrPartner => "Husband / Wife / Civil Partner",
            NearestRelative::Residing(CaringRelative::Child) => "Son or Daughter (Residing/Caring)",
            NearestRelative::Residing(CaringRelative::Parent) => "Parent (Residing/Caring)",
            NearestRelative::Residing(CaringRelative::Sibling) => "Sibling (Residing/Caring)",
            NearestRelative::Residing(CaringRelative::Other) => "Other Relative (Residing/Caring)",
            NearestRelative::EldestChild => "Eldest Son or Daughter (18+)",
            NearestRelative::EldestParent => "Mother or Father (Eldest)",
            NearestRelative::EldestSibling => "Eldest Brother or Sister (Whole Blood)",
            NearestRelative::OtherRelative => {
                "Grandparent / Grandchild / Uncle / Aunt / Nephew / Niece"
            }
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            NearestRelative::SpouseOrPartner => "s.26(1)(a): Spouse/CP takes precedence. Includes co-habitees of >6 months (s.26(6)). Section 26(4) displacement does not apply to spouses/partners.",
            NearestRelative::Residing(_) => "s.26(4) Displacement: The patient resides with or is cared for by this relative. This relative is preferred over anyone else in the hierarchy (except a spouse).",
            NearestRelative::EldestChild => "s.26(1)(b): Eldest child (18+) takes precedence in the standard hierarchy.",
            NearestRelative::EldestParent => "s.26(1)(c): Elder parent takes precedence. Note: Unmarried fathers must have PR (s.26(2)).",
            NearestRelative::EldestSibling => "s.26(1)(d): Whole blood preferred to half blood. Eldest preferred.",
            NearestRelative::OtherRelative => "s.26(1)(e)-(h): Proceed down hierarchy. Apply 'Eldest' and 'Whole Blood' rules.",
        }
    }
}

pub type NearestRelativeOutcome = WizardOutcome<NearestRelative>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestRelativeStep {
    Partner,
    PartnerEligibility,
    ResidingOrCaring,
    Hierarchy,
    Complete,
}

#[derive(Debug, Clone)]
pub struct NearestRelativeWizard {
    step: NearestRelativeStep,
}

impl Default for NearestRelativeWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestRelativeWizard {
    pub fn new() -> Self {
        Self {
            step: NearestRelativeStep::Partner,
        }
    }

    pub fn step(&self) -> NearestRelativeStep {
        self.step
    }

    /// Does the patient have a spouse, civil partner or co-habitee (>6 months)?
    pub fn answer_has_partner(&mut self, has_partner: bool) -> WizardResult<()> {
        self.expect(NearestRelativeStep::Partner, "answer the partner question")?;
        self.step = if has_partner {
            NearestRelativeStep::PartnerEligibility
        } else {
            NearestRelativeStep::ResidingOrCaring
        };
        Ok(())
    }

    /// Is the partner eligible (not permanently separated or deserted)?
    pub fn answer_partner_eligible(
        &mut self,
        eligible: bool,
    ) -> WizardResult<Option<NearestRelativeOutcome>> {
        self.expect(
            NearestRelativeStep::PartnerEligibility,
            "answer partner eligibility",
        )?;
        if eligible {
            return Ok(Some(self.finish(NearestRelative::SpouseOrPartner)));
        }
        self.step = NearestRelativeStep::ResidingOrCaring;
        Ok(None)
    }

    /// Does the patient reside with or get cared for by a relative?
    pub fn answer_residing_or_caring(
        &mut self,
        relative: Option<CaringRelative>,
    ) -> WizardResult<Option<NearestRelativeOutcome>> {
        self.expect(
            NearestRelativeStep::ResidingOrCaring,
            "answer the residing/caring question",
        )?;
        match relative {
            Some(kind) => Ok(Some(self.finish(NearestRelative::Residing(kind)))),
            None => {
                self.step = NearestRelativeStep::Hierarchy;
                Ok(None)
            }
        }
    }

    /// Which hierarchy categories are present.
    pub fn answer_hierarchy(
        &mut self,
        present: RelativesPresent,
    ) -> WizardResult<NearestRelativeOutcome> {
        self.expect(NearestRelativeStep::Hierarchy, "answer the hierarchy question")?;
        Ok(self.finish(determine_nearest_relative(false, None, present)))
    }

    fn finish(&mut self, nearest: NearestRelative) -> NearestRelativeOutcome {
        self.step = NearestRelativeStep::Complete;
        debug!(nearest = nearest.label(), "nearest relative identified");
        WizardOutcome {
            result: nearest,
            rationale: nearest.rationale().to_string(),
        }
    }

    fn expect(&self, step: NearestRelativeStep, action: &'static str) -> WizardResult<()> {
        if self.step != step {
            return Err(WizardError::InvalidStep {
                action,
                step: format!("{:?}", self.step),
            });
        }
        Ok(())
    }
}

/// Apply the s.26 priority rules to a full set of answers.
pub fn determine_nearest_relative(
    eligible_partner: bool,
    residing_or_caring: Option<CaringRelative>,
    present: RelativesPresent,
) -> NearestRelative {
    if eligible_partner {
        return NearestRelative::SpouseOrPartner;
    }
    if let Some(kind) = residing_or_caring {
        return NearestRelative::Residing(kind);
    }
    if present.children {
        NearestRelative::EldestChild
    } else if present.parents {
        NearestRelative::EldestParent
    } else if present.siblings {
        NearestRelative::EldestSibling
    } else {
        NearestRelative::OtherRelative
    }
}

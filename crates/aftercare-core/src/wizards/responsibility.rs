//! Responsible commissioner determination (ICB and Local Authority).
//!
//! Both variants start by asking whether this is a re-detention. The ICB
//! variant then takes the ICB covering the GP at the time of this
//! detention. The LA variant takes the residence immediately before
//! detention, then the Care Act placement facts, and reports the s.117
//! authority and the Care Act authority as separate determinations.

use tracing::debug;

use super::{require_text, WizardError, WizardOutcome, WizardResult};

/// Stand-in when the destination authority has not been named.
pub const UNNAMED_HOST_AUTHORITY: &str = "Host Authority";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsibilityKind {
    Icb,
    LocalAuthority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsibilityStep {
    ReDetention,
    PreDetention,
    CareActPlacement,
    Complete,
}

/// Kind of accommodation the person is moving into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementType {
    /// Care home, supported living or shared lives (Care Act s.39 deeming)
    Specified,
    /// Own tenancy or other unspecified accommodation
    Independent,
    #[default]
    Unknown,
}

/// Facts for the Care Act (non-s.117) ordinary residence question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CareActPlacement {
    /// Looked-after child / care leaver (Cornwall judgment)
    pub care_leaver: bool,
    pub out_of_area: bool,
    pub placement_type: PlacementType,
    /// Destination authority when moving out of area
    pub target_area: String,
    pub self_funder: bool,
    /// Deputy or attorney arranging the placement
    pub has_deputy_or_attorney: bool,
}

/// Why the Care Act authority was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareActBasis {
    CareLeaver,
    Deemed,
    SelfFunderNewResidence,
    NoDeeming,
    Local,
}

/// The two Local Authority duties, reported separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaDetermination {
    /// s.117(3): ordinary residence immediately before detention
    pub s117_authority: String,
    /// Care Act 2014 s.39 deeming outcome
    pub care_act_authority: String,
    pub care_act_basis: CareActBasis,
}

pub type IcbOutcome = WizardOutcome<String>;
pub type LaOutcome = WizardOutcome<LaDetermination>;

#[derive(Debug, Clone)]
pub struct ResponsibilityWizard {
    kind: ResponsibilityKind,
    step: ResponsibilityStep,
    re_detention: bool,
    residence_before_detention: String,
}

impl ResponsibilityWizard {
    pub fn new(kind: ResponsibilityKind) -> Self {
        Self {
            kind,
            step: ResponsibilityStep::ReDetention,
            re_detention: false,
            residence_before_detention: String::new(),
        }
    }

    pub fn kind(&self) -> ResponsibilityKind {
        self.kind
    }

    pub fn step(&self) -> ResponsibilityStep {
        self.step
    }

    /// Step 1: is the patient being re-detained while a previous s.117 plan
    /// is active?
    pub fn answer_re_detention(&mut self, re_detention: bool) -> WizardResult<()> {
        self.expect(ResponsibilityStep::ReDetention, "answer the re-detention question")?;
        self.re_detention = re_detention;
        self.step = ResponsibilityStep::PreDetention;
        Ok(())
    }

    /// Step 2 (ICB): the ICB covering the GP practice at this detention.
    pub fn submit_gp_icb(&mut self, gp_icb: &str) -> WizardResult<IcbOutcome> {
        self.expect_kind(ResponsibilityKind::Icb, "submit the GP's ICB")?;
        self.expect(ResponsibilityStep::PreDetention, "submit the GP's ICB")?;
        let gp_icb = require_text(gp_icb, "ICB at time of detention")?;
        self.step = ResponsibilityStep::Complete;
        Ok(determine_icb(&gp_icb, self.re_detention))
    }

    /// Step 2 (LA): where the person lived immediately before detention.
    pub fn submit_residence(&mut self, residence: &str) -> WizardResult<()> {
        self.expect_kind(ResponsibilityKind::LocalAuthority, "submit the residence")?;
        self.expect(ResponsibilityStep::PreDetention, "submit the residence")?;
        self.residence_before_detention = require_text(residence, "residence before detention")?;
        self.step = ResponsibilityStep::CareActPlacement;
        Ok(())
    }

    /// Step 3 (LA): Care Act placement facts.
    pub fn submit_placement(&mut self, placement: &CareActPlacement) -> WizardResult<LaOutcome> {
        self.expect_kind(ResponsibilityKind::LocalAuthority, "submit the placement")?;
        self.expect(ResponsibilityStep::CareActPlacement, "submit the placement")?;
        self.step = ResponsibilityStep::Complete;
        Ok(determine_la(
            &self.residence_before_detention,
            self.re_detention,
            placement,
        ))
    }

    /// Return to the previous step, keeping answers already given.
    pub fn back(&mut self) {
        self.step = match self.step {
            ResponsibilityStep::ReDetention | ResponsibilityStep::PreDetention => {
                ResponsibilityStep::ReDetention
            }
            ResponsibilityStep::CareActPlacement => ResponsibilityStep::PreDetention,
            ResponsibilityStep::Complete => ResponsibilityStep::Complete,
        };
    }

    fn expect(&self, step: ResponsibilityStep, action: &'static str) -> WizardResult<()> {
        if self.step != step {
            return Err(WizardError::InvalidStep {
                action,
                step: format!("{:?}", self.step),
            });
        }
        Ok(())
    }

    fn expect_kind(&self, kind: ResponsibilityKind, action: &'static str) -> WizardResult<()> {
        if self.kind != kind {
            return Err(WizardError::InvalidStep {
                action,
                step: format!("{:?} wizard", self.kind),
            });
        }
        Ok(())
    }
}

/// Originating ICB: the ICB of the registered GP at the time of detention.
pub fn determine_icb(gp_icb: &str, re_detention: bool) -> IcbOutcome {
    let mut rationale = format!("[ICB RESPONSIBILITY]: {gp_icb} ICB (Originating ICB).\n");
    rationale.push_str("REASONING: Under 'Who Pays? (August 2025)', the 'Originating ICB' (registered GP at initial detention) retains payment responsibility for detention and after-care until discharge from s117.");
    if re_detention {
        rationale.push_str("\nNOTE: Re-detention under s.3/37/etc triggers a fresh 'Originating ICB' assessment based on the GP at the time of the NEW detention.");
    }
    debug!(icb = gp_icb, re_detention, "ICB responsibility determined");
    WizardOutcome {
        result: gp_icb.to_string(),
        rationale,
    }
}

/// Determine both Local Authority duties.
pub fn determine_la(
    residence_before_detention: &str,
    re_detention: bool,
    placement: &CareActPlacement,
) -> LaOutcome {
    let origin = residence_before_detention;
    let (destination, destination_label) = match placement.target_area.trim() {
        "" => (UNNAMED_HOST_AUTHORITY, "Host"),
        named => (named, named),
    };

    let mut rationale = String::new();
    if re_detention {
        rationale.push_str("[RE-DETENTION IMPACT (Worcestershire Rule)]: \n");
        rationale.push_str("Under R (Worcestershire) [2023] UKSC 31, the previous s.117 duty has ENDED. A new duty is triggered upon the next discharge.\n");
        rationale.push_str(&format!(
            "Responsibility is fixed to the area of ordinary residence immediately prior to this NEW detention: {origin}.\n\n"
        ));
    }
    rationale.push_str(&format!("[s.117 LA RESPONSIBILITY]: {origin} Council.\n"));
    rationale.push_str("REASONING: Responsibility is fixed to the area of ordinary residence immediately prior to the relevant detention (MHA 1983 s.117(3)).\n\n");

    let (care_act_authority, label, basis, note) = if placement.care_leaver {
        (origin, origin, CareActBasis::CareLeaver, "(Cornwall Judgment)")
    } else if placement.out_of_area {
        match placement.placement_type {
            PlacementType::Specified
                if placement.self_funder && !placement.has_deputy_or_attorney =>
            {
                (
                    destination,
                    destination_label,
                    CareActBasis::SelfFunderNewResidence,
                    "(New OR acquired)",
                )
            }
            PlacementType::Specified => {
                (origin, origin, CareActBasis::Deemed, "(s.39 Deeming applies)")
            }
            PlacementType::Independent | PlacementType::Unknown => {
                (destination, destination_label, CareActBasis::NoDeeming, "(No Deeming)")
            }
        }
    } else {
        (origin, origin, CareActBasis::Local, "(Local)")
    };
    rationale.push_str(&format!("[CARE ACT RESPONSIBILITY]: {label} Council {note}."));

    debug!(
        s117_authority = origin,
        care_act_authority,
        ?basis,
        "LA responsibility determined"
    );

    WizardOutcome {
        result: LaDetermination {
            s117_authority: origin.to_string(),
            care_act_authority: care_act_authority.to_string(),
            care_act_basis: basis,
        },
        rationale,
    }
}

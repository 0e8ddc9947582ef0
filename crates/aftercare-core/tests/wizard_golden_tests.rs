//! Golden tests for the decision wizards and the DoL classifier.

use aftercare_core::dol::{classify, DolInputs, DolOutcome, DolStatus, SettingType};
use aftercare_core::wizards::{
    assess_capacity, determine_la, determine_nearest_relative, CareActBasis, CareActPlacement,
    CaringRelative, FunctionalTest, NearestRelative, PlacementType, RelativesPresent,
};

fn functional(understand: bool, retain: bool, weigh: bool) -> FunctionalTest {
    FunctionalTest {
        understand,
        retain,
        use_information: true,
        weigh,
        communicate: true,
    }
}

#[test]
fn test_capacity_cases() {
    let cases = vec![
        ("all-stages-met", functional(true, true, true), None, false),
        ("all-met-impairment-ignored", functional(true, true, true), Some(true), false),
        ("unable-to-weigh-impaired", functional(true, true, false), Some(true), true),
        ("unable-to-retain-no-nexus", functional(true, false, true), Some(false), false),
        ("unable-to-understand-unanswered", functional(false, true, true), None, false),
    ];

    for (id, test, impairment, expected) in cases {
        let outcome = assess_capacity("Where to live after discharge", test, impairment);
        assert_eq!(outcome.result, expected, "Case {}: capacity mismatch", id);
        assert!(
            outcome.rationale.contains("DECISION: Where to live after discharge"),
            "Case {}: decision missing from rationale",
            id
        );
    }
}

#[test]
fn test_nearest_relative_cases() {
    let none = RelativesPresent::default();
    let all = RelativesPresent {
        children: true,
        parents: true,
        siblings: true,
    };
    let parents_and_siblings = RelativesPresent {
        children: false,
        parents: true,
        siblings: true,
    };

    let cases = vec![
        ("partner-beats-everyone", true, Some(CaringRelative::Sibling), all, NearestRelative::SpouseOrPartner),
        ("carer-displaces-children", false, Some(CaringRelative::Other), all, NearestRelative::Residing(CaringRelative::Other)),
        ("children-first", false, None, all, NearestRelative::EldestChild),
        ("then-parents", false, None, parents_and_siblings, NearestRelative::EldestParent),
        ("nobody-listed", false, None, none, NearestRelative::OtherRelative),
    ];

    for (id, partner, carer, present, expected) in cases {
        let result = determine_nearest_relative(partner, carer, present);
        assert_eq!(result, expected, "Case {}: nearest relative mismatch", id);
    }
}

#[test]
fn test_care_act_residence_cases() {
    let placement = |care_leaver, out_of_area, placement_type, self_funder, deputy| {
        CareActPlacement {
            care_leaver,
            out_of_area,
            placement_type,
            target_area: "York".to_string(),
            self_funder,
            has_deputy_or_attorney: deputy,
        }
    };

    let cases = vec![
        ("care-leaver", placement(true, true, PlacementType::Independent, false, false), "Leeds", CareActBasis::CareLeaver),
        ("deemed-care-home", placement(false, true, PlacementType::Specified, false, false), "Leeds", CareActBasis::Deemed),
        ("self-funder-moves", placement(false, true, PlacementType::Specified, true, false), "York", CareActBasis::SelfFunderNewResidence),
        ("self-funder-with-deputy", placement(false, true, PlacementType::Specified, true, true), "Leeds", CareActBasis::Deemed),
        ("own-tenancy", placement(false, true, PlacementType::Independent, false, false), "York", CareActBasis::NoDeeming),
        ("staying-local", placement(false, false, PlacementType::Specified, false, false), "Leeds", CareActBasis::Local),
    ];

    for (id, placement, expected_authority, expected_basis) in cases {
        let outcome = determine_la("Leeds", false, &placement);
        assert_eq!(outcome.result.s117_authority, "Leeds", "Case {}: s.117 authority moved", id);
        assert_eq!(
            outcome.result.care_act_authority, expected_authority,
            "Case {}: Care Act authority mismatch", id
        );
        assert_eq!(outcome.result.care_act_basis, expected_basis, "Case {}: basis mismatch", id);
    }
}

#[test]
fn test_dol_cases() {
    let inputs = |supervision, free_to_leave, unable_to_consent, community_order, age, setting| {
        DolInputs {
            supervision,
            free_to_leave,
            unable_to_consent,
            community_order,
            restricted: false,
            age,
            setting,
        }
    };
    use SettingType::{Community, Institutional};

    let cases = vec![
        ("free-to-leave", inputs(true, true, true, false, Some(40), Institutional), DolOutcome::NoDeprivation, DolStatus::Ok),
        ("capacious", inputs(true, false, false, false, Some(40), Institutional), DolOutcome::CapaciousPatient, DolStatus::Critical),
        ("cto-conflict", inputs(true, false, true, true, Some(40), Community), DolOutcome::LegalConflict, DolStatus::Critical),
        ("child", inputs(true, false, true, false, Some(16), Institutional), DolOutcome::Child { age: 16 }, DolStatus::Warning),
        ("care-home", inputs(true, false, true, false, Some(70), Institutional), DolOutcome::DolsAuthorisation, DolStatus::Warning),
        ("supported-living", inputs(true, false, true, false, None, Community), DolOutcome::CourtAuthorisation, DolStatus::Warning),
    ];

    for (id, inputs, expected_outcome, expected_status) in cases {
        let assessment = classify(&inputs);
        assert_eq!(assessment.outcome, expected_outcome, "Case {}: outcome mismatch", id);
        assert_eq!(assessment.status, expected_status, "Case {}: status mismatch", id);
        assert!(!assessment.recommendation.is_empty(), "Case {}: no recommendation", id);
    }
}

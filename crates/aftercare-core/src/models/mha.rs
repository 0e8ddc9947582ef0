//! Mental Health Act sections and their s.117 eligibility.

use serde::Serialize;

/// A detention power and whether it triggers s.117 after-care.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MhaSection {
    pub code: &'static str,
    pub label: &'static str,
    /// Qualifying detention for s.117
    pub eligible: bool,
}

pub const MHA_SECTIONS: &[MhaSection] = &[
    MhaSection { code: "s2", label: "Section 2 (Assessment)", eligible: false },
    MhaSection { code: "s3", label: "Section 3 (Treatment)", eligible: true },
    MhaSection { code: "s4", label: "Section 4 (Emergency)", eligible: false },
    MhaSection { code: "s5(2)", label: "Section 5(2) (Holding)", eligible: false },
    MhaSection { code: "s37", label: "Section 37 (Hospital Order)", eligible: true },
    MhaSection { code: "s37/41", label: "Section 37/41 (Restricted)", eligible: true },
    MhaSection { code: "s45A", label: "Section 45A (Hybrid Order)", eligible: true },
    MhaSection { code: "s47", label: "Section 47 (Prison Transfer)", eligible: true },
    MhaSection { code: "s47/49", label: "Section 47/49 (Restricted Transfer)", eligible: true },
    MhaSection { code: "s48", label: "Section 48 (Remand Transfer)", eligible: true },
    MhaSection { code: "s135/136", label: "Section 135/136 (Police Powers)", eligible: false },
    MhaSection { code: "Informal", label: "Informal / Voluntary", eligible: false },
    MhaSection { code: "CTO", label: "Community Treatment Order", eligible: true },
];

/// Look up a section by its code.
pub fn find_mha_section(code: &str) -> Option<&'static MhaSection> {
    MHA_SECTIONS.iter().find(|s| s.code == code)
}

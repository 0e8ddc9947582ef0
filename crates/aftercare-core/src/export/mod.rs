//! Case file export/import and the printable support plan.

mod case_file;
mod support_plan;

pub use case_file::*;
pub use support_plan::*;

//! Domain models for the after-care planner.

mod mha;
mod need;
mod patient;

pub use mha::*;
pub use need::*;
pub use patient::*;

//! Pure policy verification (no IO).
//!
//! Input: assembly metadata loaded elsewhere, plus a resolved [`policy::PolicySet`].
//! Output: per-member verification results, aggregated into findings + verdict + summary data.

#![forbid(unsafe_code)]

pub mod hierarchy;
pub mod model;
pub mod policy;
pub mod report;
pub mod resolve;
pub mod restrictions;
pub mod walker;

mod engine;
mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{
    AssemblyOutcome, AssemblyResult, Inconclusive, SweepOutcome, VerificationResult, Violation,
    evaluate, is_applicable, sweep_assembly, verify,
};

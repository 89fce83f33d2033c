//! Stable DTOs and IDs used across the modguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical artifact path handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;

pub use explain::{ExamplePair, Explanation, lookup_explanation};
pub use path::ArtifactPath;
pub use receipt::{
    AssemblyVerdict, Finding, Location, ModguardData, ModguardReport, ReportEnvelope,
    SCHEMA_ASSEMBLY_V1, SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict,
};

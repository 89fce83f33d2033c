//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Restriction checks (one per restriction kind)
pub const CHECK_RESTRICTION_NAMESPACE: &str = "restriction.namespace";
pub const CHECK_RESTRICTION_TYPE: &str = "restriction.type";
pub const CHECK_RESTRICTION_MEMBER: &str = "restriction.member";
pub const CHECK_RESTRICTION_INHERITANCE: &str = "restriction.inheritance";

// Codes: restriction.*
pub const CODE_PROHIBITED_PRESENT: &str = "prohibited_present";
pub const CODE_REQUIRED_ABSENT: &str = "required_absent";

// Assembly input
pub const CHECK_ASSEMBLY_METADATA: &str = "assembly.metadata";
pub const CODE_MALFORMED_METADATA: &str = "malformed_metadata";
pub const CODE_UNREADABLE_ASSEMBLY: &str = "unreadable_assembly";

// Call-graph analysis
pub const CHECK_ANALYSIS_CALL_GRAPH: &str = "analysis.call_graph";
pub const CODE_WALK_LIMIT_EXCEEDED: &str = "walk_limit_exceeded";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `modguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
/// Type names are dotted strings (`UnityEngine.Object`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModguardConfigV1 {
    /// Optional schema string for tooling (`modguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Preset restriction set: `modtool` (default) or `empty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// When to fail the check: `error` (default) or `warning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// Glob patterns over assembly names whose internals are not walked.
    #[serde(default)]
    pub trusted_assemblies: Vec<String>,

    /// Host interface assemblies. Defaults to `["ModTool.Interface"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_assemblies: Option<Vec<String>>,

    /// Namespace prefixes the walker does not descend into. Defaults to `["System", "Unity"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exempt_namespaces: Option<Vec<String>>,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default, rename = "namespace")]
    pub namespaces: Vec<NamespaceRestrictionConfig>,

    #[serde(default, rename = "type")]
    pub types: Vec<TypeRestrictionConfig>,

    #[serde(default, rename = "member")]
    pub members: Vec<MemberRestrictionConfig>,

    #[serde(default)]
    pub inheritance: Vec<InheritanceRestrictionConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_methods: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NamespaceRestrictionConfig {
    pub namespace: String,
    #[serde(default)]
    pub include_nested: bool,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeRestrictionConfig {
    /// Dotted full name of the type.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemberRestrictionConfig {
    /// Dotted full name of the declaring type.
    #[serde(rename = "type")]
    pub type_name: String,
    pub member: String,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InheritanceRestrictionConfig {
    /// Dotted full name of the base type.
    pub base_type: String,
    #[serde(flatten)]
    pub common: CommonFields,
}

/// Fields shared by every restriction table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommonFields {
    /// `prohibited` (default) or `required`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub message: String,

    /// Only members declared by subclasses of this type are checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_base_type: Option<String>,

    /// `info`, `warning`, or `error` (default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

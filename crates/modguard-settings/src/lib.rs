//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{
    CommonFields, InheritanceRestrictionConfig, LimitsConfig, MemberRestrictionConfig, ModguardConfigV1,
    NamespaceRestrictionConfig, TypeRestrictionConfig,
};
pub use presets::PROFILES;
pub use resolve::{MAX_WALK_DEPTH, MAX_WALK_METHODS, Overrides, ResolvedConfig};

/// Parse `modguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ModguardConfigV1> {
    let cfg: ModguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the policy used by the engine (profile preset + config + overrides).
pub fn resolve_config(
    cfg: ModguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

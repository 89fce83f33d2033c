use crate::model::{CommonFields, ModguardConfigV1};
use crate::presets;
use anyhow::Context;
use modguard_domain::model::{MemberName, TypeName};
use modguard_domain::policy::{
    AssemblyMatcher, FailOn, PolicySet, RestrictionDef, RestrictionKind, RestrictionMode,
};
use modguard_types::Severity;

/// Upper bounds for configured walk limits.
pub const MAX_WALK_DEPTH: u32 = 100_000;
pub const MAX_WALK_METHODS: u32 = 10_000_000;

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    /// Appended to the configured trusted assemblies.
    pub trusted_assemblies: Vec<String>,
    pub max_depth: Option<u32>,
    pub max_methods: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub policy: PolicySet,
}

pub fn resolve_config(
    cfg: ModguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "modtool".to_string());

    let mut policy = presets::preset(&profile)?;

    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        policy.fail_on = parse_fail_on(fail_on_s)?;
    }

    // Trust boundary
    let mut trusted = cfg.trusted_assemblies.clone();
    trusted.extend(overrides.trusted_assemblies.iter().cloned());
    for pattern in &trusted {
        if pattern.trim().is_empty() {
            anyhow::bail!("trusted_assemblies contains an empty pattern");
        }
    }
    policy.trusted_assemblies = AssemblyMatcher::new(trusted.iter().cloned())
        .with_context(|| format!("invalid trusted_assemblies glob in {trusted:?}"))?;

    if let Some(interface) = cfg.interface_assemblies.clone() {
        policy.interface_assemblies = interface;
    }
    if let Some(exempt) = cfg.exempt_namespaces.clone() {
        if exempt.iter().any(|ns| ns.is_empty()) {
            // An empty prefix would exempt every namespace.
            anyhow::bail!("exempt_namespaces contains an empty prefix");
        }
        policy.exempt_namespaces = exempt;
    }

    // Walk limits
    if let Some(depth) = overrides.max_depth.or(cfg.limits.max_depth) {
        anyhow::ensure!(
            (1..=MAX_WALK_DEPTH).contains(&depth),
            "limits.max_depth must be between 1 and {MAX_WALK_DEPTH}, got {depth}"
        );
        policy.limits.max_depth = depth as usize;
    }
    if let Some(methods) = overrides.max_methods.or(cfg.limits.max_methods) {
        anyhow::ensure!(
            (1..=MAX_WALK_METHODS).contains(&methods),
            "limits.max_methods must be between 1 and {MAX_WALK_METHODS}, got {methods}"
        );
        policy.limits.max_methods = methods as usize;
    }

    // Config restrictions come after the preset's, in file order.
    for (idx, ns) in cfg.namespaces.iter().enumerate() {
        anyhow::ensure!(
            !ns.namespace.is_empty(),
            "namespace[{idx}]: namespace must not be empty"
        );
        let kind = RestrictionKind::Namespace {
            namespace: ns.namespace.clone(),
            include_nested: ns.include_nested,
        };
        policy.restrictions.push(
            restriction(kind, &ns.common).with_context(|| format!("invalid namespace[{idx}]"))?,
        );
    }
    for (idx, ty) in cfg.types.iter().enumerate() {
        let target = parse_type_name(&ty.type_name).with_context(|| format!("invalid type[{idx}]"))?;
        policy.restrictions.push(
            restriction(RestrictionKind::Type { target }, &ty.common)
                .with_context(|| format!("invalid type[{idx}]"))?,
        );
    }
    for (idx, m) in cfg.members.iter().enumerate() {
        let declaring =
            parse_type_name(&m.type_name).with_context(|| format!("invalid member[{idx}]"))?;
        anyhow::ensure!(!m.member.is_empty(), "member[{idx}]: member must not be empty");
        let kind = RestrictionKind::Member {
            target: MemberName::new(declaring, m.member.clone()),
        };
        policy.restrictions.push(
            restriction(kind, &m.common).with_context(|| format!("invalid member[{idx}]"))?,
        );
    }
    for (idx, inh) in cfg.inheritance.iter().enumerate() {
        let base =
            parse_type_name(&inh.base_type).with_context(|| format!("invalid inheritance[{idx}]"))?;
        policy.restrictions.push(
            restriction(RestrictionKind::Inheritance { base }, &inh.common)
                .with_context(|| format!("invalid inheritance[{idx}]"))?,
        );
    }

    Ok(ResolvedConfig { policy })
}

fn restriction(kind: RestrictionKind, common: &CommonFields) -> anyhow::Result<RestrictionDef> {
    let mode = match common.mode.as_deref() {
        None => RestrictionMode::Prohibited,
        Some(m) => parse_mode(m)?,
    };
    let severity = match common.severity.as_deref() {
        None => Severity::Error,
        Some(s) => parse_severity(s)?,
    };
    // An empty base type name means "applies everywhere".
    let applicable_base_type = common
        .applicable_base_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(TypeName::parse_dotted);

    Ok(RestrictionDef {
        kind,
        message: common.message.clone(),
        applicable_base_type,
        mode,
        severity,
    })
}

fn parse_type_name(v: &str) -> anyhow::Result<TypeName> {
    let v = v.trim();
    anyhow::ensure!(!v.is_empty(), "type name must not be empty");
    let name = TypeName::parse_dotted(v);
    anyhow::ensure!(!name.name.is_empty(), "type name must not end with '.': {v}");
    Ok(name)
}

fn parse_mode(v: &str) -> anyhow::Result<RestrictionMode> {
    match v {
        "prohibited" => Ok(RestrictionMode::Prohibited),
        "required" => Ok(RestrictionMode::Required),
        other => anyhow::bail!("unknown mode: {other} (expected prohibited|required)"),
    }
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => anyhow::bail!("unknown severity: {other} (expected info|warning|error)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    fn resolve(toml: &str, overrides: Overrides) -> anyhow::Result<PolicySet> {
        let cfg = parse_config_toml(toml)?;
        Ok(resolve_config(cfg, overrides)?.policy)
    }

    #[test]
    fn empty_config_resolves_to_modtool_defaults() {
        let policy = resolve("", Overrides::default()).expect("resolve");
        assert_eq!(policy.profile, "modtool");
        assert_eq!(policy.fail_on, FailOn::Error);
        assert_eq!(policy.restrictions.len(), 4);
        assert_eq!(policy.member_restrictions().count(), 3);
        assert_eq!(policy.inheritance_restrictions().count(), 1);
        assert_eq!(policy.interface_assemblies, vec!["ModTool.Interface"]);
        assert_eq!(policy.exempt_namespaces, vec!["System", "Unity"]);
        assert_eq!(policy.limits.max_depth, 64);
        assert_eq!(policy.limits.max_methods, 10_000);
    }

    #[test]
    fn config_restrictions_follow_preset_in_order() {
        let policy = resolve(
            r#"
profile = "empty"
fail_on = "warning"

[[namespace]]
namespace = "System.IO"
include_nested = true
message = "No file access."

[[type]]
type = "System.Net.WebClient"
message = "No networking."
severity = "warning"

[[member]]
type = "UnityEngine.Object"
member = "Destroy"
message = "Use ContentHandler.Destroy."
applicable_base_type = "UnityEngine.MonoBehaviour"

[[inheritance]]
base_type = "ModTool.Interface.ModBehaviour"
mode = "required"
message = "Derive from ModBehaviour."
applicable_base_type = ""
"#,
            Overrides::default(),
        )
        .expect("resolve");

        assert_eq!(policy.profile, "empty");
        assert_eq!(policy.fail_on, FailOn::Warning);
        let labels: Vec<&str> = policy.restrictions.iter().map(|r| r.kind.label()).collect();
        assert_eq!(labels, vec!["namespace", "type", "member", "inheritance"]);

        let ty = &policy.restrictions[1];
        assert_eq!(
            ty.kind,
            RestrictionKind::Type {
                target: TypeName::new("System.Net", "WebClient")
            }
        );
        assert_eq!(ty.severity, Severity::Warning);
        assert_eq!(ty.mode, RestrictionMode::Prohibited);

        let member = &policy.restrictions[2];
        assert_eq!(
            member.applicable_base_type,
            Some(TypeName::new("UnityEngine", "MonoBehaviour"))
        );

        let inheritance = &policy.restrictions[3];
        assert_eq!(inheritance.mode, RestrictionMode::Required);
        assert_eq!(inheritance.applicable_base_type, None);
    }

    #[test]
    fn overrides_win_over_config() {
        let policy = resolve(
            r#"
profile = "modtool"
trusted_assemblies = ["Newtonsoft.*"]
[limits]
max_depth = 10
"#,
            Overrides {
                profile: Some("empty".to_string()),
                trusted_assemblies: vec!["Vendor".to_string()],
                max_depth: Some(5),
                max_methods: Some(50),
            },
        )
        .expect("resolve");

        assert_eq!(policy.profile, "empty");
        assert!(policy.restrictions.is_empty());
        assert!(policy.is_trusted("Newtonsoft.Json"));
        assert!(policy.is_trusted("Vendor"));
        assert_eq!(policy.trusted_assemblies.patterns().len(), 2);
        assert_eq!(policy.limits.max_depth, 5);
        assert_eq!(policy.limits.max_methods, 50);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = resolve(r#"profile = "strict""#, Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown profile"));
    }

    #[test]
    fn invalid_entries_are_rejected_with_context() {
        let cases = [
            ("[[type]]\ntype = \"\"\nmessage = \"x\"", "invalid type[0]"),
            ("[[member]]\ntype = \"A.B\"\nmember = \"\"", "member must not be empty"),
            ("[[namespace]]\nnamespace = \"X\"\nmode = \"forbidden\"", "unknown mode"),
            ("[[inheritance]]\nbase_type = \"A.\"", "must not end with"),
            ("fail_on = \"never\"", "unknown fail_on"),
            ("trusted_assemblies = [\"Unity[\"]", "invalid trusted_assemblies glob"),
            ("exempt_namespaces = [\"\"]", "empty prefix"),
            ("[limits]\nmax_depth = 0", "max_depth"),
            ("[limits]\nmax_depth = 4000000000", "between 1 and 100000"),
            ("[limits]\nmax_methods = 4000000000", "max_methods must be between"),
        ];
        for (toml, needle) in cases {
            let err = resolve(toml, Overrides::default()).unwrap_err();
            let text = format!("{err:#}");
            assert!(text.contains(needle), "{toml:?}: {text}");
        }
    }

    #[test]
    fn out_of_range_limit_overrides_are_rejected() {
        let err = resolve(
            "",
            Overrides {
                max_depth: Some(MAX_WALK_DEPTH + 1),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("limits.max_depth"), "{err:#}");

        let policy = resolve(
            "",
            Overrides {
                max_depth: Some(MAX_WALK_DEPTH),
                max_methods: Some(MAX_WALK_METHODS),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(policy.limits.max_depth, MAX_WALK_DEPTH as usize);
    }

    #[test]
    fn interface_and_exempt_lists_can_be_replaced() {
        let policy = resolve(
            r#"
interface_assemblies = ["Game.ModApi"]
exempt_namespaces = ["System"]
"#,
            Overrides::default(),
        )
        .expect("resolve");
        assert!(policy.is_interface_assembly("Game.ModApi"));
        assert!(!policy.is_interface_assembly("ModTool.Interface"));
        assert!(!policy.is_exempt_namespace("UnityEngine"));
    }
}

use modguard_domain::model::{MemberName, TypeName};
use modguard_domain::policy::{PolicySet, RestrictionDef, RestrictionKind};

/// Known profile names, default first.
pub const PROFILES: &[&str] = &["modtool", "empty"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> anyhow::Result<PolicySet> {
    match profile {
        "modtool" => Ok(modtool_profile()),
        "empty" => Ok(PolicySet {
            profile: "empty".to_string(),
            ..PolicySet::default()
        }),
        other => anyhow::bail!("unknown profile: {other} (expected one of: {})", PROFILES.join(", ")),
    }
}

fn prohibit(declaring: &str, member: &str, message: &str) -> RestrictionDef {
    RestrictionDef::prohibited(
        RestrictionKind::Member {
            target: MemberName::new(TypeName::parse_dotted(declaring), member),
        },
        message,
    )
}

/// The stock policy for hosting mods: object creation and component handling must go through
/// the host's interface, and behaviours must derive from `ModBehaviour`.
fn modtool_profile() -> PolicySet {
    PolicySet {
        profile: "modtool".to_string(),
        restrictions: vec![
            prohibit(
                "UnityEngine.Object",
                "Instantiate",
                "Please use ModBehaviour.Instantiate or ContentHandler.Instantiate instead to ensure proper object creation.",
            ),
            prohibit(
                "UnityEngine.GameObject",
                "AddComponent",
                "Please use ModBehaviour.AddComponent or ContentHandler.AddComponent instead to ensure proper component handling.",
            ),
            prohibit(
                "UnityEngine.GameObject",
                ".ctor",
                "Creating new GameObjects is not allowed",
            ),
            RestrictionDef::required(
                RestrictionKind::Inheritance {
                    base: TypeName::new("ModTool.Interface", "ModBehaviour"),
                },
                "Please use ModTool.Interface.ModBehaviour instead of MonoBehaviour.",
            )
            .applicable_to(TypeName::new("UnityEngine", "MonoBehaviour")),
        ],
        ..PolicySet::default()
    }
}

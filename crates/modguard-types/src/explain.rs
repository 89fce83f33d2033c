//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after examples.
    pub examples: ExamplePair,
}

/// Before and after examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Fence language for both snippets (`csharp`, `toml`, ...).
    pub lang: &'static str,
    /// Code that would trigger a finding.
    pub before: &'static str,
    /// Code that passes the check.
    pub after: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_RESTRICTION_NAMESPACE => Some(explain_namespace()),
        ids::CHECK_RESTRICTION_TYPE => Some(explain_type()),
        ids::CHECK_RESTRICTION_MEMBER => Some(explain_member()),
        ids::CHECK_RESTRICTION_INHERITANCE => Some(explain_inheritance()),
        ids::CHECK_ASSEMBLY_METADATA => Some(explain_assembly_metadata()),
        ids::CHECK_ANALYSIS_CALL_GRAPH => Some(explain_call_graph()),

        // Codes
        ids::CODE_PROHIBITED_PRESENT => Some(explain_prohibited_present()),
        ids::CODE_REQUIRED_ABSENT => Some(explain_required_absent()),
        ids::CODE_MALFORMED_METADATA => Some(explain_malformed_metadata()),
        ids::CODE_UNREADABLE_ASSEMBLY => Some(explain_unreadable_assembly()),
        ids::CODE_WALK_LIMIT_EXCEEDED => Some(explain_walk_limit_exceeded()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_RESTRICTION_NAMESPACE,
        ids::CHECK_RESTRICTION_TYPE,
        ids::CHECK_RESTRICTION_MEMBER,
        ids::CHECK_RESTRICTION_INHERITANCE,
        ids::CHECK_ASSEMBLY_METADATA,
        ids::CHECK_ANALYSIS_CALL_GRAPH,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_PROHIBITED_PRESENT,
        ids::CODE_REQUIRED_ABSENT,
        ids::CODE_MALFORMED_METADATA,
        ids::CODE_UNREADABLE_ASSEMBLY,
        ids::CODE_WALK_LIMIT_EXCEEDED,
    ]
}

// --- Check-level explanations ---

fn explain_namespace() -> Explanation {
    Explanation {
        title: "Namespace Restriction",
        description: "\
Requires or prohibits the use of an entire namespace.

A member uses a namespace when a field or property has a type from it, when a method
references a member whose declaring type lives in it, or when a local variable is declared
with a type from it. With `include_nested = true`, nested namespaces count as well
(`System.IO` also covers `System.IO.Compression`).

Calls are followed transitively through the mod's own code, so wrapping a prohibited call in
a helper method does not hide it.",
        remediation: "\
Remove the namespace usage, or route it through the API the game exposes to mods.
If the usage lives in a library you ship alongside the mod and that library is vetted,
ask the host to add it to `trusted_assemblies`.",
        examples: ExamplePair {
            lang: "csharp",
            before: r#"using System.IO;

public class SaveMod : ModBehaviour
{
    void Save() { File.WriteAllText("save.txt", "data"); }
}"#,
            after: r#"public class SaveMod : ModBehaviour
{
    void Save() { ModStorage.Write("save", "data"); }
}"#,
        },
    }
}

fn explain_type() -> Explanation {
    Explanation {
        title: "Type Restriction",
        description: "\
Requires or prohibits the use of a specific type.

A type is used when a field, property, or local variable is declared with it, or when a
method references one of its members. Matching compares both the namespace and the
simple name.",
        remediation: "\
Replace the restricted type with the alternative named in the finding message.",
        examples: ExamplePair {
            lang: "csharp",
            before: r#"public class NetMod : ModBehaviour
{
    System.Net.WebClient client = new System.Net.WebClient();
}"#,
            after: r#"public class NetMod : ModBehaviour
{
    // Network access goes through the host API instead.
}"#,
        },
    }
}

fn explain_member() -> Explanation {
    Explanation {
        title: "Member Restriction",
        description: "\
Requires or prohibits calls to, or accesses of, a specific member of a type.

Matching compares the member's simple name and the simple name of its declaring type.
Every method the mod defines is checked together with everything it calls inside the mod
(and inside any untrusted library), so indirect calls are found as well.",
        remediation: "\
Use the replacement API named in the finding message. For the stock policy that means
`ModBehaviour.Instantiate` / `ContentHandler.Instantiate` instead of `Object.Instantiate`,
and `ContentHandler.AddComponent` instead of `GameObject.AddComponent`.",
        examples: ExamplePair {
            lang: "csharp",
            before: r#"var go = Object.Instantiate(prefab);"#,
            after: r#"var go = Content.Instantiate(prefab);"#,
        },
    }
}

fn explain_inheritance() -> Explanation {
    Explanation {
        title: "Inheritance Restriction",
        description: "\
Requires or prohibits deriving from a given base type.

Only types are checked. The base-type chain is walked through every loaded assembly, so
indirect derivation counts. Types whose chain cannot be resolved are treated as not
deriving from the target (a documented fail-open gap).",
        remediation: "\
Change the base class as named in the finding message. For the stock policy, derive from
`ModTool.Interface.ModBehaviour` instead of `UnityEngine.MonoBehaviour`.",
        examples: ExamplePair {
            lang: "csharp",
            before: r#"public class MyMod : MonoBehaviour { }"#,
            after: r#"public class MyMod : ModBehaviour { }"#,
        },
    }
}

fn explain_assembly_metadata() -> Explanation {
    Explanation {
        title: "Assembly Metadata",
        description: "\
Reports candidate assemblies whose metadata snapshot could not be read or is structurally
invalid. Verification of that assembly is aborted and the assembly is rejected; other
assemblies in the same run are still verified.",
        remediation: "\
Rebuild the mod and regenerate its metadata snapshot with the reader that ships with the
host. Do not edit snapshots by hand.",
        examples: ExamplePair {
            lang: "json",
            before: r#"{ "name": "", "types": [] }"#,
            after: r#"{ "name": "ExampleMod", "types": [] }"#,
        },
    }
}

fn explain_call_graph() -> Explanation {
    Explanation {
        title: "Call Graph Analysis",
        description: "\
Reports methods whose call graph exceeded the configured traversal limits
(`limits.max_depth`, `limits.max_methods`) before a verdict could be reached.

The mod is untrusted input, so the verifier refuses to pass code it could not fully inspect.",
        remediation: "\
Flatten deeply nested call chains, or raise the limits in `modguard.toml` if the host
accepts the extra verification cost.",
        examples: ExamplePair {
            lang: "toml",
            before: r#"[limits]
max_depth = 8"#,
            after: r#"[limits]
max_depth = 64
max_methods = 10000"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_prohibited_present() -> Explanation {
    Explanation {
        title: "Prohibited pattern present",
        description: "\
The member under test (or something it calls) uses a pattern the policy prohibits.",
        remediation: "\
Remove the usage. The finding location names the member where the walk started; the
restriction message explains the sanctioned alternative.",
        examples: explain_member().examples,
    }
}

fn explain_required_absent() -> Explanation {
    Explanation {
        title: "Required pattern absent",
        description: "\
The policy requires a pattern for members of this kind, and none was found in the member
or anything it calls.",
        remediation: "\
Add the required usage, typically by changing the base class or calling the required API.",
        examples: explain_inheritance().examples,
    }
}

fn explain_malformed_metadata() -> Explanation {
    let mut exp = explain_assembly_metadata();
    exp.title = "Malformed metadata";
    exp
}

fn explain_unreadable_assembly() -> Explanation {
    Explanation {
        title: "Unreadable assembly",
        description: "\
The candidate assembly snapshot could not be read from disk.",
        remediation: "\
Check the path and file permissions, then re-run the verifier.",
        examples: ExamplePair {
            lang: "text",
            before: "modguard check mods/Missing.json",
            after: "modguard check mods/ExampleMod.json",
        },
    }
}

fn explain_walk_limit_exceeded() -> Explanation {
    let mut exp = explain_call_graph();
    exp.title = "Walk limit exceeded";
    exp
}

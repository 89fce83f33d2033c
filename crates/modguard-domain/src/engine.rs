use crate::fingerprint::fingerprint_for_member;
use crate::hierarchy::TypeHierarchy;
use crate::model::{AssemblyModel, FieldRef, MemberRef, MethodRef, PropertyRef, TypeRef};
use crate::policy::{FailOn, PolicySet, RestrictionDef, RestrictionMode};
use crate::report::{DomainReport, SeverityCounts};
use crate::resolve::MetadataResolver;
use crate::restrictions;
use crate::walker::{Presence, present_in_call_graph};
use modguard_types::{
    ArtifactPath, AssemblyVerdict, Finding, Location, ModguardData, Severity, Verdict, ids,
};
use serde_json::json;
use std::fmt;
use tracing::{debug, info};

/// Result of checking one restriction against one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationResult {
    Pass,
    /// Carries the restriction's message.
    Violation(String),
    /// A walk limit was hit before the answer was known.
    Inconclusive,
}

/// A policy violation found in a candidate assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub restriction_message: String,
    /// Qualified name of the member under test.
    pub member: String,
    pub mode: RestrictionMode,
    pub check_id: &'static str,
    pub restriction: &'static str,
    pub target: String,
    pub severity: Severity,
    pub assembly: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {}",
            self.mode, self.member, self.restriction_message
        )
    }
}

/// A (restriction, member) pair the walker could not decide within its limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inconclusive {
    pub member: String,
    pub check_id: &'static str,
    pub target: String,
    pub assembly: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub violations: Vec<Violation>,
    pub inconclusive: Vec<Inconclusive>,
    pub types_scanned: u32,
    pub members_scanned: u32,
    pub restrictions_evaluated: u32,
}

impl SweepOutcome {
    fn record(
        &mut self,
        def: &RestrictionDef,
        member: &MemberRef,
        assembly: &str,
        result: VerificationResult,
    ) {
        self.restrictions_evaluated += 1;
        match result {
            VerificationResult::Pass => {}
            VerificationResult::Violation(message) => {
                let violation = Violation {
                    restriction_message: message,
                    member: member.qualified_name(),
                    mode: def.mode,
                    check_id: def.kind.check_id(),
                    restriction: def.kind.label(),
                    target: def.kind.target(),
                    severity: def.severity,
                    assembly: assembly.to_string(),
                };
                info!(assembly, "{violation}");
                self.violations.push(violation);
            }
            VerificationResult::Inconclusive => {
                self.inconclusive.push(Inconclusive {
                    member: member.qualified_name(),
                    check_id: def.kind.check_id(),
                    target: def.kind.target(),
                    assembly: assembly.to_string(),
                });
            }
        }
    }
}

/// Outcome of loading and sweeping one candidate assembly.
#[derive(Clone, Debug)]
pub struct AssemblyOutcome {
    pub path: ArtifactPath,
    pub result: AssemblyResult,
}

#[derive(Clone, Debug)]
pub enum AssemblyResult {
    Verified {
        assembly: String,
        sweep: SweepOutcome,
    },
    /// The snapshot parsed but failed validation.
    Malformed {
        assembly: Option<String>,
        error: String,
    },
    /// The file could not be read or is not a snapshot at all.
    Unreadable { error: String },
}

/// Does `def` apply to `member`?
///
/// Types are tested themselves; other members through their declaring type. A restriction with
/// no base type (or an empty base type name) applies everywhere.
pub fn is_applicable(
    def: &RestrictionDef,
    member: &MemberRef,
    resolver: &dyn MetadataResolver,
) -> bool {
    let subject: &TypeRef = match member {
        MemberRef::Type(t) => t,
        other => match other.declaring_type() {
            Some(t) => t,
            None => return false,
        },
    };

    let Some(base) = def.applicable_base_type.as_ref() else {
        return true;
    };
    if base.name.is_empty() {
        return true;
    }

    TypeHierarchy::new(resolver).is_subclass_of(subject, base)
}

pub fn verify(
    def: &RestrictionDef,
    member: &MemberRef,
    policy: &PolicySet,
    resolver: &dyn MetadataResolver,
) -> VerificationResult {
    if !is_applicable(def, member, resolver) {
        return VerificationResult::Pass;
    }

    let hierarchy = TypeHierarchy::new(resolver);
    let presence = match member {
        MemberRef::Method(method) => {
            let predicate = |m: &MemberRef| restrictions::present(&def.kind, m, &hierarchy);
            let local_predicate = |t: &TypeRef| restrictions::present_in_local(&def.kind, t);
            present_in_call_graph(method, &predicate, &local_predicate, policy, resolver)
        }
        other => {
            if restrictions::present(&def.kind, other, &hierarchy) {
                Presence::Present
            } else {
                Presence::Absent
            }
        }
    };

    match (def.mode, presence) {
        (RestrictionMode::Prohibited, Presence::Present)
        | (RestrictionMode::Required, Presence::Absent) => {
            VerificationResult::Violation(def.message.clone())
        }
        (_, Presence::Truncated) => VerificationResult::Inconclusive,
        _ => VerificationResult::Pass,
    }
}

/// Run every restriction against every member of interest declared by `assembly`.
///
/// Types are tested against inheritance restrictions; fields, properties and methods with a
/// body against namespace and type restrictions; methods with a body against member
/// restrictions. Every violation is kept.
pub fn sweep_assembly(
    assembly: &AssemblyModel,
    policy: &PolicySet,
    resolver: &dyn MetadataResolver,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();
    let name = assembly.name.as_str();

    for ty in &assembly.types {
        outcome.types_scanned += 1;
        let owner = ty.reference(name);

        let as_member = MemberRef::Type(owner.clone());
        for def in policy.inheritance_restrictions() {
            let result = verify(def, &as_member, policy, resolver);
            outcome.record(def, &as_member, name, result);
        }

        let values: Vec<MemberRef> = ty
            .fields
            .iter()
            .map(|f| {
                MemberRef::Field(FieldRef {
                    declaring_type: owner.clone(),
                    name: f.name.clone(),
                    field_type: f.field_type.clone(),
                })
            })
            .chain(ty.properties.iter().map(|p| {
                MemberRef::Property(PropertyRef {
                    declaring_type: owner.clone(),
                    name: p.name.clone(),
                    property_type: p.property_type.clone(),
                })
            }))
            .collect();

        let methods: Vec<MemberRef> = ty
            .methods
            .iter()
            .filter(|m| m.body.is_some())
            .map(|m| {
                MemberRef::Method(MethodRef {
                    declaring_type: owner.clone(),
                    name: m.name.clone(),
                    signature: m.signature.clone(),
                })
            })
            .collect();

        outcome.members_scanned += (values.len() + methods.len()) as u32;

        for member in values.iter().chain(&methods) {
            for def in policy.usage_restrictions() {
                let result = verify(def, member, policy, resolver);
                outcome.record(def, member, name, result);
            }
        }

        for member in &methods {
            for def in policy.member_restrictions() {
                let result = verify(def, member, policy, resolver);
                outcome.record(def, member, name, result);
            }
        }
    }

    debug!(
        assembly = name,
        types = outcome.types_scanned,
        members = outcome.members_scanned,
        violations = outcome.violations.len(),
        "sweep finished"
    );
    outcome
}

/// Turn per-assembly outcomes into findings, a verdict and summary data.
pub fn evaluate(outcomes: &[AssemblyOutcome], policy: &PolicySet) -> DomainReport {
    let mut findings: Vec<Finding> = Vec::new();
    let mut data = ModguardData {
        profile: policy.profile.clone(),
        ..ModguardData::default()
    };

    for outcome in outcomes {
        data.assemblies_scanned += 1;
        let first = findings.len();

        let assembly = match &outcome.result {
            AssemblyResult::Verified { assembly, sweep } => {
                data.types_scanned += sweep.types_scanned;
                data.members_scanned += sweep.members_scanned;
                data.restrictions_evaluated += sweep.restrictions_evaluated;
                findings.extend(
                    sweep
                        .violations
                        .iter()
                        .map(|v| violation_finding(&outcome.path, v)),
                );
                findings.extend(
                    sweep
                        .inconclusive
                        .iter()
                        .map(|i| inconclusive_finding(&outcome.path, i, policy)),
                );
                Some(assembly.clone())
            }
            AssemblyResult::Malformed { assembly, error } => {
                findings.push(metadata_finding(
                    &outcome.path,
                    assembly.as_deref(),
                    ids::CODE_MALFORMED_METADATA,
                    error,
                ));
                assembly.clone()
            }
            AssemblyResult::Unreadable { error } => {
                findings.push(metadata_finding(
                    &outcome.path,
                    None,
                    ids::CODE_UNREADABLE_ASSEMBLY,
                    error,
                ));
                None
            }
        };

        let own = &findings[first..];
        let accepted = !own.iter().any(|f| is_blocking(f.severity, policy.fail_on));
        if !accepted {
            data.assemblies_rejected += 1;
        }
        data.assemblies.push(AssemblyVerdict {
            path: outcome.path.clone(),
            assembly,
            accepted,
            violations: own.len() as u32,
        });
    }

    findings.sort_by(compare_findings);
    data.assemblies.sort_by(|a, b| a.path.cmp(&b.path));
    data.findings_total = findings.len() as u32;

    let verdict = compute_verdict(&findings, policy.fail_on);
    let counts = SeverityCounts::from_findings(&findings);

    DomainReport {
        verdict,
        findings,
        data,
        counts,
    }
}

fn violation_finding(path: &ArtifactPath, v: &Violation) -> Finding {
    let (code, help) = match v.mode {
        RestrictionMode::Prohibited => (
            ids::CODE_PROHIBITED_PRESENT,
            format!("Remove every use of {} reachable from this member.", v.target),
        ),
        RestrictionMode::Required => (
            ids::CODE_REQUIRED_ABSENT,
            format!("This member must use {}.", v.target),
        ),
    };
    let fingerprint =
        fingerprint_for_member(v.check_id, code, &v.assembly, Some(&v.member), Some(&v.target));

    Finding {
        severity: v.severity,
        check_id: v.check_id.to_string(),
        code: code.to_string(),
        message: v.to_string(),
        location: Some(Location {
            path: path.clone(),
            member: Some(v.member.clone()),
        }),
        help: Some(help),
        url: None,
        fingerprint: Some(fingerprint),
        data: json!({
            "assembly": v.assembly,
            "member": v.member,
            "restriction": v.restriction,
            "target": v.target,
            "mode": match v.mode {
                RestrictionMode::Prohibited => "prohibited",
                RestrictionMode::Required => "required",
            },
            "restriction_message": v.restriction_message,
        }),
    }
}

fn inconclusive_finding(path: &ArtifactPath, i: &Inconclusive, policy: &PolicySet) -> Finding {
    let code = ids::CODE_WALK_LIMIT_EXCEEDED;
    Finding {
        severity: Severity::Error,
        check_id: ids::CHECK_ANALYSIS_CALL_GRAPH.to_string(),
        code: code.to_string(),
        message: format!(
            "call graph of {} exceeded the walk limits while checking {}",
            i.member, i.target
        ),
        location: Some(Location {
            path: path.clone(),
            member: Some(i.member.clone()),
        }),
        help: Some(
            "Simplify the call chain, trust the assemblies it passes through, or raise limits.max_depth / limits.max_methods."
                .to_string(),
        ),
        url: None,
        fingerprint: Some(fingerprint_for_member(
            ids::CHECK_ANALYSIS_CALL_GRAPH,
            code,
            &i.assembly,
            Some(&i.member),
            Some(&i.target),
        )),
        data: json!({
            "assembly": i.assembly,
            "member": i.member,
            "restriction_check": i.check_id,
            "target": i.target,
            "max_depth": policy.limits.max_depth,
            "max_methods": policy.limits.max_methods,
        }),
    }
}

fn metadata_finding(
    path: &ArtifactPath,
    assembly: Option<&str>,
    code: &str,
    error: &str,
) -> Finding {
    let help = if code == ids::CODE_UNREADABLE_ASSEMBLY {
        "Regenerate the metadata snapshot for this assembly."
    } else {
        "The metadata snapshot is inconsistent; regenerate it with a current reader."
    };
    Finding {
        severity: Severity::Error,
        check_id: ids::CHECK_ASSEMBLY_METADATA.to_string(),
        code: code.to_string(),
        message: format!("{}: {}", path.as_str(), error),
        location: Some(Location {
            path: path.clone(),
            member: None,
        }),
        help: Some(help.to_string()),
        url: None,
        fingerprint: Some(fingerprint_for_member(
            ids::CHECK_ASSEMBLY_METADATA,
            code,
            assembly.unwrap_or(path.as_str()),
            None,
            None,
        )),
        data: json!({
            "assembly": assembly,
            "error": error,
        }),
    }
}

fn is_blocking(severity: Severity, fail_on: FailOn) -> bool {
    match severity {
        Severity::Error => true,
        Severity::Warning => fail_on == FailOn::Warning,
        Severity::Info => false,
    }
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return Verdict::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        };
    }

    Verdict::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) location.path (missing last)
    // 3) location.member (missing first)
    // 4) check_id
    // 5) code
    // 6) message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let (ap, am) = match &a.location {
        Some(l) => (l.path.as_str(), l.member.as_deref().unwrap_or("")),
        None => ("~", ""),
    };
    let (bp, bm) = match &b.location {
        Some(l) => (l.path.as_str(), l.member.as_deref().unwrap_or("")),
        None => ("~", ""),
    };

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(bp))
        .then(am.cmp(bm))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}

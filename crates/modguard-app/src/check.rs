//! The `check` use case: load candidate assemblies, verify them against policy, produce a report.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use modguard_domain::model::AssemblyModel;
use modguard_domain::policy::PolicySet;
use modguard_domain::resolve::AssemblySet;
use modguard_domain::{AssemblyOutcome, AssemblyResult, Violation, sweep_assembly};
use modguard_settings::{ModguardConfigV1, Overrides, ResolvedConfig};
use modguard_types::{ArtifactPath, ModguardReport, SCHEMA_REPORT_V1, ToolMeta, Verdict};
use rayon::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Candidate snapshot files, or directories containing them.
    pub assemblies: &'a [Utf8PathBuf],
    /// Directories searched for reference assembly snapshots.
    pub reference_dirs: &'a [Utf8PathBuf],
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: ModguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: parse config, load references, verify every candidate, build report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        ModguardConfigV1::default()
    } else {
        modguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved =
        modguard_settings::resolve_config(cfg, input.overrides.clone()).context("resolve config")?;

    let candidates = expand_candidates(input.assemblies).context("collect candidate assemblies")?;
    anyhow::ensure!(!candidates.is_empty(), "no assemblies to check");

    let references = modguard_assembly::build_reference_set(input.reference_dirs)
        .context("load reference assemblies")?;
    info!(
        profile = %resolved.policy.profile,
        candidates = candidates.len(),
        references = references.len(),
        "verifying assemblies"
    );

    // Each candidate gets its own walk state; references are shared.
    let outcomes: Vec<AssemblyOutcome> = candidates
        .par_iter()
        .map(|path| check_one(path, &resolved.policy, &references))
        .collect();

    let domain_report = modguard_domain::evaluate(&outcomes, &resolved.policy);
    let finished_at = OffsetDateTime::now_utc();

    let report = ModguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "modguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at,
        verdict: domain_report.verdict,
        findings: domain_report.findings,
        data: domain_report.data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Result of verifying one snapshot with [`verify_assembly`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssemblyVerdict {
    /// The snapshot was checked. An empty list accepts the assembly.
    Verified(Vec<Violation>),
    /// The snapshot failed structural validation and was not checked.
    Malformed { error: String },
}

impl AssemblyVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AssemblyVerdict::Verified(v) if v.is_empty())
    }
}

/// Verify a single snapshot.
///
/// Unreadable files and walks that hit their limits are errors: the assembly was not shown to
/// comply, but neither is it known to be malformed.
pub fn verify_assembly(
    path: &Utf8Path,
    policy: &PolicySet,
    references: &AssemblySet,
) -> anyhow::Result<AssemblyVerdict> {
    let model = match modguard_assembly::load_assembly(path) {
        Ok(model) => model,
        Err(err) if err.is_malformed() => {
            return Ok(AssemblyVerdict::Malformed {
                error: err.to_string(),
            });
        }
        Err(err) => return Err(anyhow::Error::from(err).context(format!("load {path}"))),
    };
    let (sweep, _) = sweep_with_references(model, policy, references);
    if let Some(first) = sweep.inconclusive.first() {
        anyhow::bail!(
            "{}: {} member check(s) exceeded the walk limits (first: {})",
            path,
            sweep.inconclusive.len(),
            first.member
        );
    }
    Ok(AssemblyVerdict::Verified(sweep.violations))
}

fn check_one(path: &Utf8Path, policy: &PolicySet, references: &AssemblySet) -> AssemblyOutcome {
    let result = match modguard_assembly::load_assembly(path) {
        Ok(model) => {
            let (sweep, assembly) = sweep_with_references(model, policy, references);
            AssemblyResult::Verified { assembly, sweep }
        }
        Err(err) if err.is_malformed() => AssemblyResult::Malformed {
            assembly: err.assembly().map(str::to_string),
            error: err.to_string(),
        },
        Err(err) => AssemblyResult::Unreadable {
            error: format!("{:#}", anyhow::Error::from(err)),
        },
    };
    AssemblyOutcome {
        path: ArtifactPath::from(path),
        result,
    }
}

fn sweep_with_references(
    model: AssemblyModel,
    policy: &PolicySet,
    references: &AssemblySet,
) -> (modguard_domain::SweepOutcome, String) {
    let mut set = references.clone();
    set.insert(model.clone());
    let sweep = sweep_assembly(&model, policy, &set);
    debug!(
        assembly = %model.name,
        violations = sweep.violations.len(),
        inconclusive = sweep.inconclusive.len(),
        "candidate verified"
    );
    (sweep, model.name)
}

fn expand_candidates(paths: &[Utf8PathBuf]) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            out.extend(modguard_assembly::discover_snapshots(path)?);
        } else {
            out.push(path.clone());
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}

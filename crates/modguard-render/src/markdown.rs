use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Modguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    let rejected = report.data.assemblies.iter().filter(|a| !a.accepted).count();
    out.push_str(&format!(
        "- Verdict: **{}**\n- Profile: `{}`\n- Assemblies: {} scanned / {} rejected\n- Findings: {}\n\n",
        verdict,
        report.data.profile,
        report.data.assemblies.len(),
        rejected,
        report.data.findings_total
    ));

    if !report.data.assemblies.is_empty() {
        out.push_str("## Assemblies\n\n| Assembly | File | Result | Findings |\n|---|---|---|---|\n");
        for a in &report.data.assemblies {
            out.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                a.assembly.as_deref().unwrap_or("?"),
                a.path,
                if a.accepted { "accepted" } else { "rejected" },
                a.violations
            ));
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            RenderableSeverity::Info => "INFO",
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };

        out.push_str(&format!(
            "- [{}] `{}` / `{}`: {}",
            sev,
            f.check_id.as_deref().unwrap_or(""),
            f.code,
            f.message
        ));
        if let Some(loc) = &f.location {
            match &loc.member {
                Some(member) => out.push_str(&format!(" (`{}` in `{}`)", member, loc.path)),
                None => out.push_str(&format!(" (`{}`)", loc.path)),
            }
        }
        out.push('\n');

        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {}\n", help));
        }
        if let Some(url) = &f.url {
            out.push_str(&format!("  - url: {}\n", url));
        }
    }

    out
}

//! Render use cases: markdown and GitHub annotations from in-memory reports.

use modguard_render::RenderableReport;

pub fn render_markdown(report: &RenderableReport) -> String {
    modguard_render::render_markdown(report)
}

/// At most `max` annotations, in report order (errors first).
pub fn render_annotations(report: &RenderableReport, max: usize) -> Vec<String> {
    modguard_render::render_github_annotations(report)
        .into_iter()
        .take(max)
        .collect()
}

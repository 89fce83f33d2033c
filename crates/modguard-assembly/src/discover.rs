use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Find every `*.json` snapshot under `dir`, sorted by path.
pub fn discover_snapshots(dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let meta = std::fs::metadata(dir).with_context(|| format!("stat {dir}"))?;
    anyhow::ensure!(meta.is_dir(), "{dir} is not a directory");

    let mut out: Vec<Utf8PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
        .filter(|p| p.extension() == Some("json"))
        .collect();

    out.sort();
    Ok(out)
}

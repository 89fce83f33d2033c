//! Assembly adapters: read metadata snapshots, validate them, discover reference assemblies.
//!
//! This crate is allowed to do filesystem IO. Snapshots are produced by an external metadata
//! reader; nothing here looks at compiled binaries.

#![forbid(unsafe_code)]

mod discover;
mod parse;
mod validate;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use modguard_domain::model::AssemblyModel;
use modguard_domain::resolve::AssemblySet;
use rayon::prelude::*;
use tracing::{debug, warn};

pub use discover::discover_snapshots;
pub use parse::{MetadataError, parse_assembly};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    /// Parse and validate arbitrary text as an assembly snapshot.
    ///
    /// Returns `Ok(...)` on a valid snapshot, `Err(...)` otherwise. **Never panics** on any input.
    pub fn parse_assembly(text: &str) -> anyhow::Result<()> {
        let _ = super::parse::parse_assembly(text)?;
        Ok(())
    }
}

/// Read and validate one snapshot file.
pub fn load_assembly(path: &Utf8Path) -> Result<AssemblyModel, MetadataError> {
    let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_assembly(&text)
}

/// Load every snapshot under `dirs` into a reference set.
///
/// Snapshots are loaded in parallel. A snapshot that fails to load is logged and skipped: its
/// members then fail to resolve, which the verifier treats as "not present". When two snapshots
/// declare the same assembly name, the one with the lexicographically later path wins.
pub fn build_reference_set(dirs: &[Utf8PathBuf]) -> anyhow::Result<AssemblySet> {
    let mut paths: Vec<Utf8PathBuf> = Vec::new();
    for dir in dirs {
        let found = discover_snapshots(dir)
            .with_context(|| format!("discover reference assemblies in {dir}"))?;
        paths.extend(found);
    }
    paths.sort();
    paths.dedup();

    let loaded: Vec<(Utf8PathBuf, AssemblyModel)> = paths
        .par_iter()
        .filter_map(|path| match load_assembly(path) {
            Ok(model) => Some((path.clone(), model)),
            Err(err) => {
                warn!(path = %path, error = %err, "skipping reference assembly");
                None
            }
        })
        .collect();

    let mut set = AssemblySet::new();
    for (path, model) in loaded {
        if set.contains(&model.name) {
            warn!(path = %path, assembly = %model.name, "duplicate reference assembly; replacing");
        }
        debug!(path = %path, assembly = %model.name, types = model.types.len(), "loaded reference");
        set.insert(model);
    }
    Ok(set)
}

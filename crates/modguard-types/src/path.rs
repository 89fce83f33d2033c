use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical artifact path used in findings and reports.
///
/// Normalization rules are intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading `./`
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ArtifactPath(String);

impl Default for ArtifactPath {
    fn default() -> Self {
        ArtifactPath::new(".")
    }
}

impl ArtifactPath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_utf8_pathbuf(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.0.clone())
    }

    /// Final path segment, used as a display name for the assembly file.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl From<&Utf8Path> for ArtifactPath {
    fn from(value: &Utf8Path) -> Self {
        ArtifactPath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for ArtifactPath {
    fn from(value: Utf8PathBuf) -> Self {
        ArtifactPath::new(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_leading_dot() {
        assert_eq!(ArtifactPath::new(".\\mods\\Example.json").as_str(), "mods/Example.json");
        assert_eq!(ArtifactPath::new("././a.json").as_str(), "a.json");
        assert_eq!(ArtifactPath::new("").as_str(), ".");
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(ArtifactPath::new("mods/Example.json").file_name(), "Example.json");
        assert_eq!(ArtifactPath::new("Example.json").file_name(), "Example.json");
    }
}

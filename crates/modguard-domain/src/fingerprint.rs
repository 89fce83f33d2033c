use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - check_id
/// - code
/// - assembly (name, or artifact path when the name is unknown)
/// - member under test (if any)
/// - restriction target (if any)
pub fn fingerprint_for_member(
    check_id: &str,
    code: &str,
    assembly: &str,
    member: Option<&str>,
    target: Option<&str>,
) -> String {
    let canonical = [
        check_id,
        code,
        assembly,
        member.unwrap_or(""),
        target.unwrap_or(""),
    ]
    .join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

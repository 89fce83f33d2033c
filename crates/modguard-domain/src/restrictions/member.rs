use crate::model::{MemberName, MemberRef};

/// Compares simple names only; the declaring type's namespace is not consulted.
pub(super) fn present(target: &MemberName, member: &MemberRef) -> bool {
    if member.name() != target.member {
        return false;
    }
    match member.declaring_type() {
        Some(declaring) => declaring.name == target.declaring_type.name,
        None => true,
    }
}

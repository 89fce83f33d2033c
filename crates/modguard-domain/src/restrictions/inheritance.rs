use crate::hierarchy::TypeHierarchy;
use crate::model::{MemberRef, TypeName};

pub(super) fn present(base: &TypeName, member: &MemberRef, hierarchy: &TypeHierarchy<'_>) -> bool {
    match member {
        MemberRef::Type(ty) => hierarchy.is_subclass_of(ty, base),
        _ => false,
    }
}

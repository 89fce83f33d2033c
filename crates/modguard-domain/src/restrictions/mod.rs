//! Restriction predicates.
//!
//! Each kind answers two questions: is the restriction's pattern present in a referenced member,
//! and is it present in a local variable declaration.

use crate::hierarchy::TypeHierarchy;
use crate::model::{MemberRef, TypeRef};
use crate::policy::RestrictionKind;

mod inheritance;
mod member;
mod namespace;
mod type_usage;


pub fn present(kind: &RestrictionKind, member: &MemberRef, hierarchy: &TypeHierarchy<'_>) -> bool {
    match kind {
        RestrictionKind::Namespace {
            namespace,
            include_nested,
        } => namespace::present(namespace, *include_nested, member),
        RestrictionKind::Type { target } => type_usage::present(target, member),
        RestrictionKind::Member { target } => member::present(target, member),
        RestrictionKind::Inheritance { base } => inheritance::present(base, member, hierarchy),
    }
}

pub fn present_in_local(kind: &RestrictionKind, local_type: &TypeRef) -> bool {
    match kind {
        RestrictionKind::Namespace {
            namespace,
            include_nested,
        } => namespace::matches(namespace, *include_nested, &local_type.namespace),
        RestrictionKind::Type { target } => target.matches(local_type),
        RestrictionKind::Member { .. } | RestrictionKind::Inheritance { .. } => false,
    }
}

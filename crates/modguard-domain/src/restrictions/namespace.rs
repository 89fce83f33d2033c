use crate::model::MemberRef;

pub(super) fn present(namespace: &str, include_nested: bool, member: &MemberRef) -> bool {
    let observed = match member {
        MemberRef::Type(t) => &t.namespace,
        MemberRef::Field(f) => &f.field_type.namespace,
        MemberRef::Property(p) => &p.property_type.namespace,
        MemberRef::Method(m) => &m.declaring_type.namespace,
    };
    matches(namespace, include_nested, observed)
}

/// Nested matching is a plain string prefix: `System.IO` also covers `System.IO.Compression`.
pub(super) fn matches(namespace: &str, include_nested: bool, observed: &str) -> bool {
    if include_nested {
        observed.starts_with(namespace)
    } else {
        observed == namespace
    }
}

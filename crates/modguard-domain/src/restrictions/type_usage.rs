use crate::model::{MemberRef, TypeName};

/// A field or property uses its value type; anything else uses its declaring type.
pub(super) fn present(target: &TypeName, member: &MemberRef) -> bool {
    match member {
        MemberRef::Field(f) => target.matches(&f.field_type),
        MemberRef::Property(p) => target.matches(&p.property_type),
        other => other
            .declaring_type()
            .is_some_and(|declaring| target.matches(declaring)),
    }
}

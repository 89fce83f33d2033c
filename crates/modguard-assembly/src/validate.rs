//! Structural checks on a parsed snapshot.

use modguard_domain::model::{AssemblyModel, MemberRef, TypeDef, TypeRef};
use std::collections::BTreeSet;

pub(crate) fn validate(model: &AssemblyModel) -> Result<(), String> {
    if model.name.trim().is_empty() {
        return Err("assembly name is empty".to_string());
    }

    let mut seen_types = BTreeSet::new();
    for ty in &model.types {
        if ty.name.is_empty() {
            return Err(format!("type with empty name in namespace '{}'", ty.namespace));
        }
        if ty.name.split('/').any(str::is_empty) {
            return Err(format!("type {} has an empty nested name segment", ty.name));
        }
        let full = ty.type_name().to_string();
        if !seen_types.insert((ty.namespace.as_str(), ty.name.as_str())) {
            return Err(format!("duplicate type definition {full}"));
        }
        validate_type(ty).map_err(|reason| format!("{full}: {reason}"))?;
    }
    Ok(())
}

fn validate_type(ty: &TypeDef) -> Result<(), String> {
    if let Some(base) = &ty.base_type {
        check_ref(base, "base type")?;
    }

    for field in &ty.fields {
        if field.name.is_empty() {
            return Err("field with empty name".to_string());
        }
        check_ref(&field.field_type, &format!("field {}", field.name))?;
    }

    for prop in &ty.properties {
        if prop.name.is_empty() {
            return Err("property with empty name".to_string());
        }
        check_ref(&prop.property_type, &format!("property {}", prop.name))?;
    }

    let mut seen_methods = BTreeSet::new();
    for method in &ty.methods {
        if method.name.is_empty() {
            return Err("method with empty name".to_string());
        }
        let id = format!("{}{}", method.name, method.signature);
        if !seen_methods.insert((method.name.as_str(), method.signature.as_str())) {
            return Err(format!("duplicate method overload {id}"));
        }
        let Some(body) = &method.body else { continue };
        for local in &body.locals {
            check_ref(&local.var_type, &format!("{id} local {}", local.index))?;
        }
        for instr in &body.instructions {
            if let Some(operand) = &instr.operand {
                check_operand(operand)
                    .map_err(|reason| format!("{id} at IL_{:04x}: {reason}", instr.offset))?;
            }
        }
    }
    Ok(())
}

fn check_operand(operand: &MemberRef) -> Result<(), String> {
    if operand.name().is_empty() {
        return Err("operand with empty member name".to_string());
    }
    match operand {
        MemberRef::Type(t) => check_ref(t, "operand"),
        MemberRef::Field(f) => {
            check_ref(&f.declaring_type, "operand declaring type")?;
            check_ref(&f.field_type, "operand field type")
        }
        MemberRef::Property(p) => {
            check_ref(&p.declaring_type, "operand declaring type")?;
            check_ref(&p.property_type, "operand property type")
        }
        MemberRef::Method(m) => check_ref(&m.declaring_type, "operand declaring type"),
    }
}

fn check_ref(ty: &TypeRef, what: &str) -> Result<(), String> {
    if ty.assembly.trim().is_empty() {
        return Err(format!("{what} {} has no owning assembly", ty.full_name()));
    }
    if ty.name.is_empty() {
        return Err(format!("{what} references a type with an empty name"));
    }
    Ok(())
}

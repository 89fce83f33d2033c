//! Assembly metadata model.
//!
//! These are read-only snapshots produced by the metadata reader. Nothing here knows how the
//! snapshot was obtained; the verifier only borrows it for the duration of a run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(namespace, simple name)` pair used by policy configuration.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct TypeName {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split a dotted full name at the last `.`: `UnityEngine.Object` -> (`UnityEngine`, `Object`).
    pub fn parse_dotted(full: &str) -> Self {
        match full.rsplit_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("", full),
        }
    }

    pub fn matches(&self, ty: &TypeRef) -> bool {
        self.namespace == ty.namespace && self.name == ty.name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// A `(declaring type, member name)` pair used by member restrictions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemberName {
    pub declaring_type: TypeName,
    pub member: String,
}

impl MemberName {
    pub fn new(declaring_type: TypeName, member: impl Into<String>) -> Self {
        Self {
            declaring_type,
            member: member.into(),
        }
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.member)
    }
}

/// Reference to a type defined in some assembly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TypeRef {
    /// Name of the assembly that owns the definition.
    pub assembly: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(
        assembly: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            assembly: assembly.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn type_name(&self) -> TypeName {
        TypeName::new(self.namespace.clone(), self.name.clone())
    }

    /// `Namespace.Name`, or just `Name` for the global namespace.
    pub fn full_name(&self) -> String {
        self.type_name().to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.assembly, self.type_name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub field_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyRef {
    pub declaring_type: TypeRef,
    pub name: String,
    pub property_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodRef {
    pub declaring_type: TypeRef,
    pub name: String,
    /// Parameter list as written by the reader, e.g. `(UnityEngine.Object)`. Distinguishes overloads.
    #[serde(default)]
    pub signature: String,
}

impl MethodRef {
    /// Assembly-qualified identity used for cycle detection.
    pub fn full_name(&self) -> String {
        format!(
            "[{}]{}::{}{}",
            self.declaring_type.assembly,
            self.declaring_type.full_name(),
            self.name,
            self.signature
        )
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// A member referenced from metadata: the operand of an instruction, or a declared member
/// under test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberRef {
    Type(TypeRef),
    Field(FieldRef),
    Property(PropertyRef),
    Method(MethodRef),
}

impl MemberRef {
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Type(t) => &t.name,
            MemberRef::Field(f) => &f.name,
            MemberRef::Property(p) => &p.name,
            MemberRef::Method(m) => &m.name,
        }
    }

    /// Declaring type; `None` for (top-level) types.
    pub fn declaring_type(&self) -> Option<&TypeRef> {
        match self {
            MemberRef::Type(_) => None,
            MemberRef::Field(f) => Some(&f.declaring_type),
            MemberRef::Property(p) => Some(&p.declaring_type),
            MemberRef::Method(m) => Some(&m.declaring_type),
        }
    }

    /// Assembly that owns the referenced definition.
    pub fn assembly(&self) -> &str {
        match self {
            MemberRef::Type(t) => &t.assembly,
            MemberRef::Field(f) => &f.declaring_type.assembly,
            MemberRef::Property(p) => &p.declaring_type.assembly,
            MemberRef::Method(m) => &m.declaring_type.assembly,
        }
    }

    /// Human-readable name used in violations: `Ns.Type`, `Ns.Type::member`, `Ns.Type::Method(sig)`.
    pub fn qualified_name(&self) -> String {
        match self {
            MemberRef::Type(t) => t.full_name(),
            MemberRef::Field(f) => format!("{}::{}", f.declaring_type.full_name(), f.name),
            MemberRef::Property(p) => format!("{}::{}", p.declaring_type.full_name(), p.name),
            MemberRef::Method(m) => format!(
                "{}::{}{}",
                m.declaring_type.full_name(),
                m.name,
                m.signature
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LocalVar {
    #[serde(default)]
    pub index: u32,
    pub var_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Instruction {
    #[serde(default)]
    pub offset: u32,
    pub opcode: String,
    /// Only member operands are kept by the reader; literals and branch targets are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<MemberRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodBody {
    #[serde(default)]
    pub locals: Vec<LocalVar>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodDef {
    pub name: String,
    #[serde(default)]
    pub signature: String,
    /// Absent for abstract, extern and interface methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MethodBody>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDef {
    pub name: String,
    pub field_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDef {
    pub name: String,
    pub property_type: TypeRef,
}

/// A type defined by an assembly.
///
/// Nested types are listed flat in `AssemblyModel::types`. They carry the namespace of their
/// outermost type and a `/`-separated path as `name` (`Outer/Inner`, `Spawner/<>c`), the same
/// form references to them use, so `(namespace, name)` is unique within an assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeDef {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl TypeDef {
    pub fn type_name(&self) -> TypeName {
        TypeName::new(self.namespace.clone(), self.name.clone())
    }

    /// Reference to this definition as owned by `assembly`.
    pub fn reference(&self, assembly: &str) -> TypeRef {
        TypeRef::new(assembly, self.namespace.clone(), self.name.clone())
    }

    pub fn find_method(&self, name: &str, signature: &str) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.signature == signature)
    }
}

/// One assembly's metadata snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssemblyModel {
    /// Optional schema tag (`modguard.assembly.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl AssemblyModel {
    pub fn new(name: impl Into<String>, types: Vec<TypeDef>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            types,
        }
    }
}

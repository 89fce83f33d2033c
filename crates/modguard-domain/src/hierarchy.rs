//! Type hierarchy queries over resolved metadata.

use crate::model::{TypeDef, TypeName, TypeRef};
use crate::resolve::{MetadataResolver, ResolutionError};
use std::collections::HashSet;
use tracing::{debug, warn};

const CORE_LIBRARIES: &[&str] = &[
    "mscorlib",
    "netstandard",
    "System.Runtime",
    "System.Private.CoreLib",
];

/// The core library's `System.Object` ends every chain without being resolved, so the core
/// library need not be loaded. A `System.Object` declared anywhere else is an ordinary type.
fn is_root(ty: &TypeRef) -> bool {
    ty.namespace == "System"
        && ty.name == "Object"
        && CORE_LIBRARIES.contains(&ty.assembly.as_str())
}

#[derive(Clone, Copy)]
pub struct TypeHierarchy<'a> {
    resolver: &'a dyn MetadataResolver,
}

impl<'a> TypeHierarchy<'a> {
    pub fn new(resolver: &'a dyn MetadataResolver) -> Self {
        Self { resolver }
    }

    pub fn resolve(&self, ty: &TypeRef) -> Result<&'a TypeDef, ResolutionError> {
        self.resolver.resolve_type(ty)
    }

    /// Strict subclass test: walks the base chain of `ty` looking for `base`.
    ///
    /// A type is not a subclass of itself. Resolution failures and cycles end the walk with
    /// `false` (fail-open on applicability).
    pub fn is_subclass_of(&self, ty: &TypeRef, base: &TypeName) -> bool {
        let mut current = match self.resolve(ty) {
            Ok(def) => def,
            Err(err) => {
                warn!(r#type = %ty, error = %err, "cannot resolve type; treating as not a subclass");
                return false;
            }
        };

        let mut visited: HashSet<&TypeRef> = HashSet::new();
        visited.insert(ty);

        loop {
            let Some(parent) = current.base_type.as_ref() else {
                return false;
            };
            if base.matches(parent) {
                return true;
            }
            if is_root(parent) {
                return false;
            }
            if !visited.insert(parent) {
                warn!(r#type = %ty, at = %parent, "inheritance cycle in metadata");
                return false;
            }
            current = match self.resolve(parent) {
                Ok(def) => def,
                Err(err) => {
                    warn!(
                        r#type = %ty,
                        base = %parent,
                        error = %err,
                        "cannot resolve base type; treating as not a subclass"
                    );
                    return false;
                }
            };
            debug!(r#type = %ty, step = %parent, "walked base type");
        }
    }
}

//! Reference resolution over a set of loaded assemblies.

use crate::model::{AssemblyModel, MethodDef, MethodRef, TypeDef, TypeRef};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Why a reference could not be resolved. Never fatal: callers log it and treat the
/// reference as "not present / not applicable".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("assembly '{0}' is not loaded")]
    AssemblyNotFound(String),
    #[error("type '{0}' is not defined in its assembly")]
    TypeNotFound(String),
    #[error("method '{0}' is not defined on its declaring type")]
    MethodNotFound(String),
}

/// Resolves references to their definitions.
pub trait MetadataResolver {
    fn resolve_type(&self, ty: &TypeRef) -> Result<&TypeDef, ResolutionError>;

    fn resolve_method(&self, method: &MethodRef) -> Result<&MethodDef, ResolutionError> {
        let owner = self.resolve_type(&method.declaring_type)?;
        owner
            .find_method(&method.name, &method.signature)
            .ok_or_else(|| ResolutionError::MethodNotFound(method.full_name()))
    }
}

#[derive(Debug)]
struct IndexedAssembly {
    model: AssemblyModel,
    types: HashMap<(String, String), usize>,
}

impl IndexedAssembly {
    fn new(model: AssemblyModel) -> Self {
        let mut types = HashMap::with_capacity(model.types.len());
        for (idx, ty) in model.types.iter().enumerate() {
            // First definition wins; duplicates are rejected by the loader.
            types
                .entry((ty.namespace.clone(), ty.name.clone()))
                .or_insert(idx);
        }
        Self { model, types }
    }
}

/// The candidate assembly plus every reference assembly it may resolve into.
///
/// Cloning is cheap: assemblies are shared, so a base set of references can be extended with a
/// different candidate per worker.
#[derive(Clone, Debug, Default)]
pub struct AssemblySet {
    assemblies: BTreeMap<String, Arc<IndexedAssembly>>,
}

impl AssemblySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assembly, replacing any previously loaded assembly with the same name.
    pub fn insert(&mut self, model: AssemblyModel) {
        self.assemblies
            .insert(model.name.clone(), Arc::new(IndexedAssembly::new(model)));
    }

    pub fn get(&self, name: &str) -> Option<&AssemblyModel> {
        self.assemblies.get(name).map(|a| &a.model)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assemblies.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assemblies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }
}

impl FromIterator<AssemblyModel> for AssemblySet {
    fn from_iter<I: IntoIterator<Item = AssemblyModel>>(iter: I) -> Self {
        let mut set = AssemblySet::new();
        for model in iter {
            set.insert(model);
        }
        set
    }
}

impl MetadataResolver for AssemblySet {
    fn resolve_type(&self, ty: &TypeRef) -> Result<&TypeDef, ResolutionError> {
        let assembly = self
            .assemblies
            .get(&ty.assembly)
            .ok_or_else(|| ResolutionError::AssemblyNotFound(ty.assembly.clone()))?;
        assembly
            .types
            .get(&(ty.namespace.clone(), ty.name.clone()))
            .and_then(|idx| assembly.model.types.get(*idx))
            .ok_or_else(|| ResolutionError::TypeNotFound(ty.to_string()))
    }
}

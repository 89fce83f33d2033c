use crate::validate;
use modguard_domain::model::AssemblyModel;
use modguard_types::SCHEMA_ASSEMBLY_V1;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("cannot read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not an assembly snapshot: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("unsupported snapshot schema '{0}' (expected modguard.assembly.v1)")]
    UnsupportedSchema(String),
    #[error("assembly '{assembly}': {reason}")]
    Invalid { assembly: String, reason: String },
}

impl MetadataError {
    /// The snapshot was read and parsed, but its content is inconsistent.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            MetadataError::UnsupportedSchema(_) | MetadataError::Invalid { .. }
        )
    }

    /// Assembly name, when the snapshot got far enough to declare one.
    pub fn assembly(&self) -> Option<&str> {
        match self {
            MetadataError::Invalid { assembly, .. } if !assembly.is_empty() => Some(assembly),
            _ => None,
        }
    }
}

/// Parse and validate a snapshot document.
pub fn parse_assembly(text: &str) -> Result<AssemblyModel, MetadataError> {
    let model: AssemblyModel = serde_json::from_str(text)?;
    if let Some(schema) = model.schema.as_deref()
        && schema != SCHEMA_ASSEMBLY_V1
    {
        return Err(MetadataError::UnsupportedSchema(schema.to_string()));
    }
    validate::validate(&model).map_err(|reason| MetadataError::Invalid {
        assembly: model.name.clone(),
        reason,
    })?;
    Ok(model)
}

use crate::model::{MemberName, TypeName};
use globset::{Glob, GlobSet, GlobSetBuilder};
use modguard_types::{Severity, ids};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestrictionMode {
    Prohibited,
    Required,
}

impl fmt::Display for RestrictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestrictionMode::Prohibited => f.write_str("Prohibited"),
            RestrictionMode::Required => f.write_str("Required"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestrictionKind {
    Namespace {
        namespace: String,
        include_nested: bool,
    },
    Type {
        target: TypeName,
    },
    Member {
        target: MemberName,
    },
    Inheritance {
        base: TypeName,
    },
}

impl RestrictionKind {
    pub fn check_id(&self) -> &'static str {
        match self {
            RestrictionKind::Namespace { .. } => ids::CHECK_RESTRICTION_NAMESPACE,
            RestrictionKind::Type { .. } => ids::CHECK_RESTRICTION_TYPE,
            RestrictionKind::Member { .. } => ids::CHECK_RESTRICTION_MEMBER,
            RestrictionKind::Inheritance { .. } => ids::CHECK_RESTRICTION_INHERITANCE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RestrictionKind::Namespace { .. } => "namespace",
            RestrictionKind::Type { .. } => "type",
            RestrictionKind::Member { .. } => "member",
            RestrictionKind::Inheritance { .. } => "inheritance",
        }
    }

    /// What the restriction is about, for reports.
    pub fn target(&self) -> String {
        match self {
            RestrictionKind::Namespace {
                namespace,
                include_nested,
            } => {
                if *include_nested {
                    format!("{namespace}*")
                } else {
                    namespace.clone()
                }
            }
            RestrictionKind::Type { target } => target.to_string(),
            RestrictionKind::Member { target } => target.to_string(),
            RestrictionKind::Inheritance { base } => base.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestrictionDef {
    pub kind: RestrictionKind,
    pub message: String,
    /// `None` applies the restriction to every member.
    pub applicable_base_type: Option<TypeName>,
    pub mode: RestrictionMode,
    pub severity: Severity,
}

impl RestrictionDef {
    pub fn prohibited(kind: RestrictionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            applicable_base_type: None,
            mode: RestrictionMode::Prohibited,
            severity: Severity::Error,
        }
    }

    pub fn required(kind: RestrictionKind, message: impl Into<String>) -> Self {
        Self {
            mode: RestrictionMode::Required,
            ..Self::prohibited(kind, message)
        }
    }

    pub fn applicable_to(mut self, base: TypeName) -> Self {
        self.applicable_base_type = Some(base);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

/// Ceilings for a single call-graph walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkLimits {
    pub max_depth: usize,
    pub max_methods: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_methods: 10_000,
        }
    }
}

/// Glob patterns over assembly names (`UnityEngine*`, `Mono.Cecil`).
#[derive(Clone, Debug)]
pub struct AssemblyMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl AssemblyMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, globset::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            set: builder.build()?,
            patterns,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn is_match(&self, assembly: &str) -> bool {
        self.set.is_match(assembly)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for AssemblyMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

/// Everything one verification run needs to know about policy. Built once, then shared
/// read-only by every worker.
#[derive(Clone, Debug)]
pub struct PolicySet {
    pub profile: String,
    pub fail_on: FailOn,
    /// Preset restrictions first, then configured ones, in declaration order.
    pub restrictions: Vec<RestrictionDef>,
    /// Assemblies whose internals are not walked.
    pub trusted_assemblies: AssemblyMatcher,
    /// Host interface assemblies; references into them are ignored entirely.
    pub interface_assemblies: Vec<String>,
    /// Namespace prefixes whose members are not walked into.
    pub exempt_namespaces: Vec<String>,
    pub limits: WalkLimits,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            profile: "empty".to_string(),
            fail_on: FailOn::Error,
            restrictions: Vec::new(),
            trusted_assemblies: AssemblyMatcher::empty(),
            interface_assemblies: vec!["ModTool.Interface".to_string()],
            exempt_namespaces: vec!["System".to_string(), "Unity".to_string()],
            limits: WalkLimits::default(),
        }
    }
}

impl PolicySet {
    pub fn is_trusted(&self, assembly: &str) -> bool {
        self.trusted_assemblies.is_match(assembly)
    }

    pub fn is_interface_assembly(&self, assembly: &str) -> bool {
        self.interface_assemblies.iter().any(|a| a == assembly)
    }

    pub fn is_exempt_namespace(&self, namespace: &str) -> bool {
        self.exempt_namespaces
            .iter()
            .any(|prefix| namespace.starts_with(prefix.as_str()))
    }

    pub fn inheritance_restrictions(&self) -> impl Iterator<Item = &RestrictionDef> {
        self.restrictions
            .iter()
            .filter(|r| matches!(r.kind, RestrictionKind::Inheritance { .. }))
    }

    /// Restrictions evaluated against fields, properties and methods.
    pub fn usage_restrictions(&self) -> impl Iterator<Item = &RestrictionDef> {
        self.restrictions.iter().filter(|r| {
            matches!(
                r.kind,
                RestrictionKind::Namespace { .. } | RestrictionKind::Type { .. }
            )
        })
    }

    pub fn member_restrictions(&self) -> impl Iterator<Item = &RestrictionDef> {
        self.restrictions
            .iter()
            .filter(|r| matches!(r.kind, RestrictionKind::Member { .. }))
    }
}

// Copyright 2025 Cowboy AI, LLC.

//! Value-equal configuration of one target's mixins

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::mixin_declaration::{MixinDeclaration, MixinDeclarationSummary};
use crate::errors::ConfigurationError;
use crate::types::TypeRef;

/// One target type plus the set of mixins declared for it
///
/// Equality and hashing are by value: two contexts built from the same
/// declarations in any order are equal. This is the composition cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassContext {
    target_type: TypeRef,
    mixins: BTreeMap<TypeRef, MixinDeclaration>,
}

impl ClassContext {
    /// Create a validated context
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the target cannot host a
    /// composite, a mixin is invalid or conflicts with another declaration of
    /// itself, or a dependency names an undeclared mixin.
    pub fn new<I>(target_type: &TypeRef, declarations: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = MixinDeclaration>,
    {
        validate_target(target_type)?;

        let mut mixins: BTreeMap<TypeRef, MixinDeclaration> = BTreeMap::new();
        for declaration in declarations {
            validate_declaration(target_type, &declaration)?;
            match mixins.get_mut(declaration.mixin_type()) {
                Some(existing) if existing.is_compatible_with(&declaration) => {
                    existing.merge(declaration);
                }
                Some(_) => {
                    return Err(ConfigurationError::ConflictingDeclaration {
                        target: target_type.name().to_string(),
                        mixin: declaration.mixin_type().name().to_string(),
                    });
                }
                None => {
                    mixins.insert(declaration.mixin_type().clone(), declaration);
                }
            }
        }

        for declaration in mixins.values() {
            if let Some(dangling) = declaration
                .additional_dependencies()
                .iter()
                .find(|dep| !mixins.contains_key(*dep))
            {
                return Err(ConfigurationError::DanglingDependency {
                    target: target_type.name().to_string(),
                    mixin: declaration.mixin_type().name().to_string(),
                    dependency: dangling.name().to_string(),
                });
            }
        }

        Ok(Self {
            target_type: target_type.clone(),
            mixins,
        })
    }

    /// Start building a context for `target_type`
    pub fn builder(target_type: &TypeRef) -> ClassContextBuilder {
        ClassContextBuilder {
            target_type: target_type.clone(),
            declarations: Vec::new(),
        }
    }

    /// The target type
    pub fn target_type(&self) -> &TypeRef {
        &self.target_type
    }

    /// Declarations ordered by mixin name
    pub fn mixins(&self) -> impl Iterator<Item = &MixinDeclaration> {
        self.mixins.values()
    }

    /// Declaration for a mixin type
    pub fn mixin(&self, mixin_type: &TypeRef) -> Option<&MixinDeclaration> {
        self.mixins.get(mixin_type)
    }

    /// Whether a mixin type is declared
    pub fn contains_mixin(&self, mixin_type: &TypeRef) -> bool {
        self.mixins.contains_key(mixin_type)
    }

    /// Number of declared mixins
    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    /// Whether no mixins are declared
    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }

    /// Every mixin type suppressed by any declaration
    pub fn suppressed_types(&self) -> BTreeSet<TypeRef> {
        self.mixins
            .values()
            .flat_map(|d| d.suppressed_mixin_types().iter().cloned())
            .collect()
    }

    /// Serializable summary
    pub fn summary(&self) -> ClassContextSummary {
        ClassContextSummary {
            target_type: self.target_type.name().to_string(),
            mixins: self.mixins.values().map(MixinDeclaration::summary).collect(),
        }
    }
}

impl fmt::Display for ClassContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mixins: Vec<String> = self.mixins.values().map(ToString::to_string).collect();
        write!(f, "{} [{}]", self.target_type, mixins.join("; "))
    }
}

fn validate_target(target: &TypeRef) -> Result<(), ConfigurationError> {
    let reason = if target.is_interface() {
        Some("interfaces cannot host a composite type")
    } else if target.is_generic_definition() {
        Some("open generic type definitions cannot host a composite type")
    } else if target.is_sealed() {
        Some("sealed types cannot be subclassed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigurationError::InvalidTarget {
            target: target.name().to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn validate_declaration(
    target: &TypeRef,
    declaration: &MixinDeclaration,
) -> Result<(), ConfigurationError> {
    let mixin = declaration.mixin_type();
    if mixin == target {
        return Err(ConfigurationError::MixinIsTarget {
            mixin: mixin.name().to_string(),
        });
    }

    let reason = if mixin.is_interface() {
        Some("interfaces cannot be mixed in")
    } else if mixin.is_generic_definition() {
        Some("open generic mixin definitions must be closed before composition")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(ConfigurationError::InvalidMixin {
            target: target.name().to_string(),
            mixin: mixin.name().to_string(),
            reason: reason.to_string(),
        });
    }

    if declaration.suppressed_mixin_types().contains(mixin) {
        return Err(ConfigurationError::SelfSuppression {
            target: target.name().to_string(),
            mixin: mixin.name().to_string(),
        });
    }

    Ok(())
}

/// Collects declarations for one target in any order
#[derive(Debug, Clone)]
pub struct ClassContextBuilder {
    target_type: TypeRef,
    declarations: Vec<MixinDeclaration>,
}

impl ClassContextBuilder {
    /// Add a declaration
    pub fn mixin(mut self, declaration: MixinDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Add a plain "target uses mixin" declaration
    pub fn uses(self, mixin_type: &TypeRef) -> Self {
        self.mixin(MixinDeclaration::used(mixin_type))
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// See [`ClassContext::new`].
    pub fn build(self) -> Result<ClassContext, ConfigurationError> {
        ClassContext::new(&self.target_type, self.declarations)
    }
}

/// Name-only rendering of a [`ClassContext`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassContextSummary {
    /// Target type name
    pub target_type: String,
    /// Declarations ordered by mixin name
    pub mixins: Vec<MixinDeclarationSummary>,
}

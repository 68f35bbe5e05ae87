// Copyright 2025 Cowboy AI, LLC.

//! One mixin assigned to a target

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TypeRef;

/// How the mixin came to be assigned to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MixinKind {
    /// The target declares that it uses the mixin
    Used,
    /// The mixin declares that it extends the target
    Extending,
}

/// Visibility of members the mixin introduces into the composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum IntroducedMemberVisibility {
    /// Reachable only through the introduced interface
    #[default]
    Private,
    /// Also reachable by member name on the composite
    Public,
}

/// A mixin declared for one target, with its ordering and suppression rules
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MixinDeclaration {
    mixin_type: TypeRef,
    kind: MixinKind,
    introduced_member_visibility: IntroducedMemberVisibility,
    additional_dependencies: BTreeSet<TypeRef>,
    suppressed_mixin_types: BTreeSet<TypeRef>,
}

impl MixinDeclaration {
    /// Create a declaration
    pub fn new(mixin_type: &TypeRef, kind: MixinKind) -> Self {
        Self {
            mixin_type: mixin_type.clone(),
            kind,
            introduced_member_visibility: IntroducedMemberVisibility::default(),
            additional_dependencies: BTreeSet::new(),
            suppressed_mixin_types: BTreeSet::new(),
        }
    }

    /// Target uses the mixin
    pub fn used(mixin_type: &TypeRef) -> Self {
        Self::new(mixin_type, MixinKind::Used)
    }

    /// Mixin extends the target
    pub fn extending(mixin_type: &TypeRef) -> Self {
        Self::new(mixin_type, MixinKind::Extending)
    }

    /// Set the visibility of introduced members
    pub fn with_visibility(mut self, visibility: IntroducedMemberVisibility) -> Self {
        self.introduced_member_visibility = visibility;
        self
    }

    /// Require `dependency` to be ordered before this mixin
    pub fn depends_on(mut self, dependency: &TypeRef) -> Self {
        self.additional_dependencies.insert(dependency.clone());
        self
    }

    /// Exclude `mixin` from the target's composition
    pub fn suppresses(mut self, mixin: &TypeRef) -> Self {
        self.suppressed_mixin_types.insert(mixin.clone());
        self
    }

    /// The mixin type
    pub fn mixin_type(&self) -> &TypeRef {
        &self.mixin_type
    }

    /// How the mixin was assigned
    pub fn kind(&self) -> MixinKind {
        self.kind
    }

    /// Visibility of introduced members
    pub fn introduced_member_visibility(&self) -> IntroducedMemberVisibility {
        self.introduced_member_visibility
    }

    /// Mixins that must precede this one
    pub fn additional_dependencies(&self) -> &BTreeSet<TypeRef> {
        &self.additional_dependencies
    }

    /// Mixins this declaration suppresses
    pub fn suppressed_mixin_types(&self) -> &BTreeSet<TypeRef> {
        &self.suppressed_mixin_types
    }

    /// Whether two declarations of the same mixin agree on kind and visibility
    pub(crate) fn is_compatible_with(&self, other: &MixinDeclaration) -> bool {
        self.mixin_type == other.mixin_type
            && self.kind == other.kind
            && self.introduced_member_visibility == other.introduced_member_visibility
    }

    /// Fold the rule sets of a compatible duplicate into this declaration
    pub(crate) fn merge(&mut self, other: MixinDeclaration) {
        self.additional_dependencies
            .extend(other.additional_dependencies);
        self.suppressed_mixin_types.extend(other.suppressed_mixin_types);
    }

    /// Serializable summary
    pub fn summary(&self) -> MixinDeclarationSummary {
        MixinDeclarationSummary {
            mixin_type: self.mixin_type.name().to_string(),
            kind: self.kind,
            introduced_member_visibility: self.introduced_member_visibility,
            additional_dependencies: names(&self.additional_dependencies),
            suppressed_mixin_types: names(&self.suppressed_mixin_types),
        }
    }
}

fn names(types: &BTreeSet<TypeRef>) -> Vec<String> {
    types.iter().map(|t| t.name().to_string()).collect()
}

impl fmt::Display for MixinDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mixin_type)?;
        if !self.additional_dependencies.is_empty() {
            write!(f, " after [{}]", names(&self.additional_dependencies).join(", "))?;
        }
        if !self.suppressed_mixin_types.is_empty() {
            write!(f, " suppressing [{}]", names(&self.suppressed_mixin_types).join(", "))?;
        }
        Ok(())
    }
}

/// Name-only rendering of a [`MixinDeclaration`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinDeclarationSummary {
    /// Mixin type name
    pub mixin_type: String,
    /// How the mixin was assigned
    pub kind: MixinKind,
    /// Visibility of introduced members
    pub introduced_member_visibility: IntroducedMemberVisibility,
    /// Names of required predecessors
    pub additional_dependencies: Vec<String>,
    /// Names of suppressed mixins
    pub suppressed_mixin_types: Vec<String>,
}

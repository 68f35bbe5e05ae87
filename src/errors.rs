// Copyright 2025 Cowboy AI, LLC.

//! Error types for mixin composition
//!
//! Composition fails in one of three non-overlapping ways:
//! - [`ConfigurationError`]: structural problems found before any member is
//!   examined. Always a single, fail-fast error.
//! - [`ValidationReport`]: override and interface conflicts found while
//!   resolving members. Every conflict is collected into one report.
//! - [`CodeGenerationError`]: the dispatch structure could not be
//!   materialized. Fatal for that one composition.
//!
//! [`InvocationError`] is separate: it is raised by member bodies when a
//! composite instance is used, never by the engine while composing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The same mixin is declared twice for one target with different settings
    #[error("Mixin {mixin} is declared twice for {target} with conflicting settings")]
    ConflictingDeclaration {
        /// Target type name
        target: String,
        /// Mixin type name
        mixin: String,
    },

    /// A mixin names a dependency that is not declared for the target
    #[error("Mixin {mixin} on {target} depends on {dependency}, which is not a declared mixin")]
    DanglingDependency {
        /// Target type name
        target: String,
        /// Mixin declaring the dependency
        mixin: String,
        /// The undeclared dependency
        dependency: String,
    },

    /// The target type cannot host a composite type
    #[error("Invalid target type {target}: {reason}")]
    InvalidTarget {
        /// Target type name
        target: String,
        /// Why the target is rejected
        reason: String,
    },

    /// The mixin type cannot be composed
    #[error("Invalid mixin type {mixin} for {target}: {reason}")]
    InvalidMixin {
        /// Target type name
        target: String,
        /// Mixin type name
        mixin: String,
        /// Why the mixin is rejected
        reason: String,
    },

    /// A mixin is declared for its own type
    #[error("Mixin {mixin} cannot be applied to itself")]
    MixinIsTarget {
        /// Mixin (and target) type name
        mixin: String,
    },

    /// A mixin lists itself among its suppressed mixins
    #[error("Mixin {mixin} on {target} suppresses itself")]
    SelfSuppression {
        /// Target type name
        target: String,
        /// Mixin type name
        mixin: String,
    },

    /// The dependency graph contains a cycle
    #[error("cyclic mixin dependency on {target}: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Target type name
        target: String,
        /// Mixins forming the cycle, in dependency order
        cycle: Vec<String>,
    },
}

/// A single override or interface conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ValidationError {
    /// The override names a member the target does not have
    #[error("Mixin {mixin} overrides {member}, which does not exist on {target}")]
    OverrideTargetNotFound {
        /// Target type name
        target: String,
        /// Mixin declaring the override
        mixin: String,
        /// Rendered member signature
        member: String,
    },

    /// The override names a member that cannot be overridden
    #[error("Mixin {mixin} overrides {member} on {target}, which is {reason}")]
    NonOverridableMember {
        /// Target type name
        target: String,
        /// Mixin declaring the override
        mixin: String,
        /// Rendered member signature
        member: String,
        /// Why the member is not overridable
        reason: String,
    },

    /// A mixin declares two overrides with the same signature
    #[error("Mixin {mixin} declares more than one override for {member}")]
    DuplicateOverride {
        /// Mixin declaring the overrides
        mixin: String,
        /// Rendered member signature
        member: String,
    },

    /// More than one mixin introduces the same interface
    #[error("Interface {interface} is introduced into {target} by more than one mixin: {}", .mixins.join(", "))]
    AmbiguousIntroduction {
        /// Target type name
        target: String,
        /// Interface type name
        interface: String,
        /// Every mixin introducing the interface
        mixins: Vec<String>,
    },

    /// An introduced interface member has no implementation on the mixin
    #[error("Mixin {mixin} introduces {interface} but does not implement {member}")]
    IncompleteInterface {
        /// Mixin introducing the interface
        mixin: String,
        /// Interface type name
        interface: String,
        /// Rendered member signature
        member: String,
    },

    /// A mixin requires an interface nothing in the composition provides
    #[error("Mixin {mixin} requires {interface}, which is neither implemented by {target} nor introduced by another mixin")]
    UnsatisfiedRequirement {
        /// Target type name
        target: String,
        /// Mixin declaring the requirement
        mixin: String,
        /// Interface type name
        interface: String,
    },
}

/// Every validation error found for one class context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Target type name
    pub target: String,
    /// Collected errors in discovery order
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Create an empty report for a target
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            errors: Vec::new(),
        }
    }

    /// Record an error
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Whether no errors were recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over recorded errors
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// `Ok(())` when empty, otherwise the report itself as an error
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error(s) for {}",
            self.errors.len(),
            self.target
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// The dispatch structure could not be materialized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeGenerationError {
    /// An override chain exceeds the indirection limit
    #[error("Override chain for {member} on {target} has {length} entries, limit is {limit}")]
    ChainTooLong {
        /// Target type name
        target: String,
        /// Rendered member signature
        member: String,
        /// Chain length
        length: usize,
        /// Configured limit
        limit: usize,
    },

    /// More mixin slots are needed than an instance can hold
    #[error("Composite for {target} needs {count} mixin slots, limit is {limit}")]
    TooManySlots {
        /// Target type name
        target: String,
        /// Required slot count
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// The dispatch table would exceed its entry limit
    #[error("Dispatch table for {target} needs {count} entries, limit is {limit}")]
    DispatchTableTooLarge {
        /// Target type name
        target: String,
        /// Required entry count
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// A member that must be dispatched has no body to dispatch to
    #[error("{owner} has no implementation for {member}")]
    MissingBody {
        /// Type expected to provide the body
        owner: String,
        /// Rendered member signature
        member: String,
    },
}

/// Errors raised while calling members on a composite instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// No callable member matches
    #[error("Member not found on {type_name}: {member}")]
    MemberNotFound {
        /// Composite or interface type name
        type_name: String,
        /// Requested member
        member: String,
    },

    /// A name lookup matched more than one signature
    #[error("Member name {member} is ambiguous on {type_name}: {}", .candidates.join(", "))]
    AmbiguousMember {
        /// Composite type name
        type_name: String,
        /// Requested member name
        member: String,
        /// Matching signatures
        candidates: Vec<String>,
    },

    /// Base call made where no next implementation exists
    #[error("No base implementation for {member}")]
    NoBaseImplementation {
        /// Rendered member signature
        member: String,
    },

    /// The composite instance owning a mixin instance is gone
    #[error("Owner of mixin {mixin} has been dropped")]
    OwnerDropped {
        /// Mixin type name
        mixin: String,
    },

    /// Arguments do not fit the member
    #[error("Invalid arguments for {member}: {reason}")]
    InvalidArguments {
        /// Rendered member signature
        member: String,
        /// What is wrong
        reason: String,
    },

    /// Failure raised by a member body
    #[error("{0}")]
    Failed(String),
}

impl InvocationError {
    /// Create a body failure
    pub fn failed(msg: impl Into<String>) -> Self {
        InvocationError::Failed(msg.into())
    }
}

/// Any error composition can produce
#[derive(Debug, Clone, Error)]
pub enum MixinError {
    /// Structural configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Aggregated validation errors
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationReport),

    /// Dispatch structure could not be built
    #[error("Code generation error: {0}")]
    CodeGeneration(#[from] CodeGenerationError),
}

/// Result type for composition operations
pub type MixinResult<T> = Result<T, MixinError>;

/// Result type for member calls on composite instances
pub type InvocationResult<T> = Result<T, InvocationError>;

impl MixinError {
    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, MixinError::Configuration(_))
    }

    /// Check if this is a validation error report
    pub fn is_validation_error(&self) -> bool {
        matches!(self, MixinError::Validation(_))
    }

    /// Check if this is a code generation error
    pub fn is_code_generation_error(&self) -> bool {
        matches!(self, MixinError::CodeGeneration(_))
    }

    /// Short, stable name of the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            MixinError::Configuration(_) => ErrorKind::Configuration,
            MixinError::Validation(_) => ErrorKind::Validation,
            MixinError::CodeGeneration(_) => ErrorKind::CodeGeneration,
        }
    }
}

/// Kind of a [`MixinError`], for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// [`MixinError::Configuration`]
    Configuration,
    /// [`MixinError::Validation`]
    Validation,
    /// [`MixinError::CodeGeneration`]
    CodeGeneration,
}

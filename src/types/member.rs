// Copyright 2025 Cowboy AI, LLC.

//! Members, signatures and member bodies

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codegen::Invocation;
use crate::errors::InvocationResult;

/// Executable body of a member
///
/// A body receives the [`Invocation`] it runs in (which gives access to the
/// composite instance, the state of the declaring type and the base-call
/// continuation) plus the call arguments.
pub type MemberBody =
    Arc<dyn Fn(&Invocation<'_>, &[Value]) -> InvocationResult<Value> + Send + Sync>;

/// Wrap a closure as a [`MemberBody`]
pub fn body<F>(f: F) -> MemberBody
where
    F: Fn(&Invocation<'_>, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Exact member signature
///
/// Two members are override-compatible iff their signatures are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberSignature {
    name: String,
    parameter_types: Vec<String>,
    return_type: String,
}

impl MemberSignature {
    /// Create a signature from its parts
    pub fn new<I, S>(name: impl Into<String>, parameter_types: I, return_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        }
    }

    /// Parameterless signature returning `void`
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_types: Vec::new(),
            return_type: "void".to_string(),
        }
    }

    /// Append a parameter type
    pub fn param(mut self, ty: impl Into<String>) -> Self {
        self.parameter_types.push(ty.into());
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = ty.into();
        self
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type names, in order
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// Return type name
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}",
            self.name,
            self.parameter_types.join(", "),
            self.return_type
        )
    }
}

/// Accessibility of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible to derived types
    Protected,
    /// Visible inside the defining module
    Internal,
    /// Visible only to the defining type
    Private,
}

/// Dispatch-relevant member modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberModifiers {
    /// Member participates in virtual dispatch
    pub is_virtual: bool,
    /// Member is sealed against further overriding
    pub is_sealed: bool,
    /// Member accessibility
    pub visibility: Visibility,
}

impl MemberModifiers {
    /// Public virtual member
    pub fn overridable() -> Self {
        Self {
            is_virtual: true,
            is_sealed: false,
            visibility: Visibility::Public,
        }
    }

    /// Public non-virtual member
    pub fn fixed() -> Self {
        Self {
            is_virtual: false,
            is_sealed: false,
            visibility: Visibility::Public,
        }
    }

    /// Set the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark sealed
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Why a member with these modifiers cannot be overridden, if it cannot
    pub fn override_restriction(&self) -> Option<&'static str> {
        if !self.is_virtual {
            Some("not virtual")
        } else if self.is_sealed {
            Some("sealed")
        } else if self.visibility == Visibility::Private {
            Some("private")
        } else {
            None
        }
    }

    /// Whether a mixin may override a member with these modifiers
    pub fn is_overridable(&self) -> bool {
        self.override_restriction().is_none()
    }
}

impl Default for MemberModifiers {
    fn default() -> Self {
        Self::overridable()
    }
}

/// A member declared by a type
#[derive(Clone)]
pub struct MemberDefinition {
    /// Member signature
    pub signature: MemberSignature,
    /// Member modifiers
    pub modifiers: MemberModifiers,
    /// Member body; `None` for interface members
    pub body: Option<MemberBody>,
}

impl fmt::Debug for MemberDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDefinition")
            .field("signature", &self.signature.to_string())
            .field("modifiers", &self.modifiers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// An override a mixin declares for a target member
#[derive(Clone)]
pub struct OverrideDefinition {
    /// Signature of the overridden target member
    pub signature: MemberSignature,
    /// Override body
    pub body: MemberBody,
}

impl fmt::Debug for OverrideDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideDefinition")
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

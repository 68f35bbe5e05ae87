// Copyright 2025 Cowboy AI, LLC.

//! Nominal type handles and their definitions
//!
//! The engine composes *nominal* types known at configuration time. A
//! [`TypeRef`] is a cheap handle to an immutable [`TypeDefinition`]; equality,
//! hashing and ordering use the full type name only. Registering two
//! different shapes under one name is a usage error the engine cannot detect.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::member::{
    MemberBody, MemberDefinition, MemberModifiers, MemberSignature, OverrideDefinition,
};
use crate::codegen::Invocation;
use crate::errors::InvocationResult;

/// Whether a type is a class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// Concrete class; can be a target or a mixin
    Class,
    /// Interface; can be introduced or required, never composed into
    Interface,
}

/// Immutable description of one nominal type
#[derive(Debug)]
pub struct TypeDefinition {
    full_name: String,
    kind: TypeKind,
    is_generic_definition: bool,
    is_sealed: bool,
    members: Vec<MemberDefinition>,
    overrides: Vec<OverrideDefinition>,
    implemented_interfaces: Vec<TypeRef>,
    required_interfaces: Vec<TypeRef>,
    fields: BTreeMap<String, Value>,
}

impl TypeDefinition {
    /// Start building a class
    pub fn class(full_name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(full_name.into(), TypeKind::Class)
    }

    /// Start building an interface
    pub fn interface(full_name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(full_name.into(), TypeKind::Interface)
    }
}

/// Handle to a [`TypeDefinition`] with nominal identity
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDefinition>);

impl TypeRef {
    /// Full type name
    pub fn name(&self) -> &str {
        &self.0.full_name
    }

    /// Class or interface
    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        self.0.kind == TypeKind::Interface
    }

    /// Whether this is an open generic type definition
    pub fn is_generic_definition(&self) -> bool {
        self.0.is_generic_definition
    }

    /// Whether the type is sealed against subclassing
    pub fn is_sealed(&self) -> bool {
        self.0.is_sealed
    }

    /// Members declared by the type, in declaration order
    pub fn members(&self) -> &[MemberDefinition] {
        &self.0.members
    }

    /// Find a member by exact signature
    pub fn find_member(&self, signature: &MemberSignature) -> Option<&MemberDefinition> {
        self.0.members.iter().find(|m| &m.signature == signature)
    }

    /// Members whose name matches, in declaration order
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberDefinition> + 'a {
        self.0.members.iter().filter(move |m| m.signature.name() == name)
    }

    /// Overrides declared by the type, in declaration order
    pub fn overrides(&self) -> &[OverrideDefinition] {
        &self.0.overrides
    }

    /// Find an override by exact signature (first declared wins)
    pub fn find_override(&self, signature: &MemberSignature) -> Option<&OverrideDefinition> {
        self.0.overrides.iter().find(|o| &o.signature == signature)
    }

    /// Interfaces the type implements directly
    pub fn implemented_interfaces(&self) -> &[TypeRef] {
        &self.0.implemented_interfaces
    }

    /// Whether the type implements an interface directly
    pub fn implements(&self, interface: &TypeRef) -> bool {
        self.0.implemented_interfaces.contains(interface)
    }

    /// Interfaces the type requires from the composite it is mixed into
    pub fn required_interfaces(&self) -> &[TypeRef] {
        &self.0.required_interfaces
    }

    /// Initial field values copied into every instance
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.0.fields
    }

    /// Underlying definition
    pub fn definition(&self) -> &TypeDefinition {
        &self.0
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.full_name == other.0.full_name
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.full_name.hash(state);
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.full_name.cmp(&other.0.full_name)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.full_name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.full_name)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.full_name)
    }
}

/// Fluent builder for [`TypeDefinition`]s
///
/// # Example
///
/// ```
/// use cim_mixin::{MemberSignature, TypeDefinition};
/// use serde_json::json;
///
/// let order = TypeDefinition::class("Shop.Order")
///     .field("total", json!(0))
///     .virtual_method(MemberSignature::method("describe").returns("string"), |_, _| {
///         Ok(json!("order"))
///     })
///     .build();
///
/// assert_eq!(order.name(), "Shop.Order");
/// assert_eq!(order.members().len(), 1);
/// ```
#[derive(Debug)]
pub struct TypeBuilder {
    definition: TypeDefinition,
}

impl TypeBuilder {
    fn new(full_name: String, kind: TypeKind) -> Self {
        Self {
            definition: TypeDefinition {
                full_name,
                kind,
                is_generic_definition: false,
                is_sealed: false,
                members: Vec::new(),
                overrides: Vec::new(),
                implemented_interfaces: Vec::new(),
                required_interfaces: Vec::new(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Mark as an open generic type definition
    pub fn generic_definition(mut self) -> Self {
        self.definition.is_generic_definition = true;
        self
    }

    /// Mark as sealed
    pub fn sealed(mut self) -> Self {
        self.definition.is_sealed = true;
        self
    }

    /// Add a member with explicit modifiers and body
    pub fn member(
        mut self,
        signature: MemberSignature,
        modifiers: MemberModifiers,
        body: Option<MemberBody>,
    ) -> Self {
        self.definition.members.push(MemberDefinition {
            signature,
            modifiers,
            body,
        });
        self
    }

    /// Add a public virtual method
    pub fn virtual_method<F>(self, signature: MemberSignature, f: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    {
        self.member(signature, MemberModifiers::overridable(), Some(Arc::new(f)))
    }

    /// Add a public non-virtual method
    pub fn method<F>(self, signature: MemberSignature, f: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    {
        self.member(signature, MemberModifiers::fixed(), Some(Arc::new(f)))
    }

    /// Add a bodiless interface member
    pub fn abstract_member(self, signature: MemberSignature) -> Self {
        self.member(signature, MemberModifiers::overridable(), None)
    }

    /// Declare an override for a target member
    pub fn override_member<F>(mut self, signature: MemberSignature, f: F) -> Self
    where
        F: Fn(&Invocation<'_>, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    {
        self.definition.overrides.push(OverrideDefinition {
            signature,
            body: Arc::new(f),
        });
        self
    }

    /// Declare an implemented interface
    pub fn implements(mut self, interface: &TypeRef) -> Self {
        if !self.definition.implemented_interfaces.contains(interface) {
            self.definition.implemented_interfaces.push(interface.clone());
        }
        self
    }

    /// Declare an interface required from the composite
    pub fn requires(mut self, interface: &TypeRef) -> Self {
        if !self.definition.required_interfaces.contains(interface) {
            self.definition.required_interfaces.push(interface.clone());
        }
        self
    }

    /// Add a field with its initial value
    pub fn field(mut self, name: impl Into<String>, initial: Value) -> Self {
        self.definition.fields.insert(name.into(), initial);
        self
    }

    /// Finish the definition
    pub fn build(self) -> TypeRef {
        TypeRef(Arc::new(self.definition))
    }
}

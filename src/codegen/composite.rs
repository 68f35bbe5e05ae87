// Copyright 2025 Cowboy AI, LLC.

//! Composite types and their instances
//!
//! A [`CompositeType`] is the generated artifact for one class context: a
//! dispatch table over the target's members plus forwarding for every
//! introduced interface. It is a cheap handle; clones share the same build,
//! and [`CompositeType::same_handle`] tells builds apart.
//!
//! A [`CompositeInstance`] holds the target's fields and one
//! [`MixinInstance`] per composed mixin, in composition order. Each mixin
//! instance refers back to its owner through a `Weak`, so the pair never keeps
//! itself alive.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use super::dispatch::{self, DispatchEntry, DispatchTable, InterfaceForwarder};
use crate::context::{ClassContext, MixinDeclaration};
use crate::errors::{InvocationError, InvocationResult};
use crate::resolution::CompositionPlan;
use crate::types::{InstanceState, MemberSignature, TypeRef};

pub(crate) struct CompositeTypeParts {
    pub(crate) name: String,
    pub(crate) generation: u64,
    pub(crate) context: ClassContext,
    pub(crate) ordered_mixins: Vec<MixinDeclaration>,
    pub(crate) dispatch: DispatchTable,
    pub(crate) interfaces: IndexMap<TypeRef, InterfaceForwarder>,
    pub(crate) plan: CompositionPlan,
}

struct CompositeTypeInner {
    id: Uuid,
    created_at: DateTime<Utc>,
    parts: CompositeTypeParts,
}

/// Generated composite type
#[derive(Clone)]
pub struct CompositeType {
    inner: Arc<CompositeTypeInner>,
}

impl CompositeType {
    pub(crate) fn new(parts: CompositeTypeParts) -> Self {
        Self {
            inner: Arc::new(CompositeTypeInner {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                parts,
            }),
        }
    }

    /// Unique id of this build
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Generated type name
    pub fn name(&self) -> &str {
        &self.inner.parts.name
    }

    /// Cache generation the type was built in
    pub fn generation(&self) -> u64 {
        self.inner.parts.generation
    }

    /// Build time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// The backing class context
    pub fn class_context(&self) -> &ClassContext {
        &self.inner.parts.context
    }

    /// The target type
    pub fn target_type(&self) -> &TypeRef {
        self.inner.parts.context.target_type()
    }

    /// Mixins in composition order; one slot per entry
    pub fn ordered_mixins(&self) -> &[MixinDeclaration] {
        &self.inner.parts.ordered_mixins
    }

    /// Dispatch table over the target's members
    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.inner.parts.dispatch
    }

    /// Introduced interfaces and their forwarding
    pub fn introduced_interfaces(&self) -> impl Iterator<Item = &InterfaceForwarder> {
        self.inner.parts.interfaces.values()
    }

    /// Forwarding for one introduced interface
    pub fn introduced_interface(&self, interface: &TypeRef) -> Option<&InterfaceForwarder> {
        self.inner.parts.interfaces.get(interface)
    }

    /// Whether instances can be viewed as `interface`
    pub fn implements(&self, interface: &TypeRef) -> bool {
        self.inner.parts.interfaces.contains_key(interface) || self.target_type().implements(interface)
    }

    /// Composition decisions by name
    pub fn plan(&self) -> &CompositionPlan {
        &self.inner.parts.plan
    }

    /// Whether both handles come from the same build
    pub fn same_handle(&self, other: &CompositeType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Construct an instance with the declared field defaults
    pub fn create_instance(&self) -> CompositeInstance {
        self.create_instance_with(BTreeMap::new())
    }

    /// Construct an instance, overriding target field defaults
    pub fn create_instance_with(&self, fields: BTreeMap<String, Value>) -> CompositeInstance {
        let mut target_fields = self.target_type().fields().clone();
        target_fields.extend(fields);

        let inner = Arc::new_cyclic(|owner: &Weak<InstanceInner>| InstanceInner {
            composite: self.clone(),
            target: InstanceState::new(target_fields),
            mixins: self
                .ordered_mixins()
                .iter()
                .enumerate()
                .map(|(slot, declaration)| MixinInstance {
                    mixin_type: declaration.mixin_type().clone(),
                    slot,
                    state: InstanceState::new(declaration.mixin_type().fields().clone()),
                    owner: owner.clone(),
                })
                .collect(),
        });

        CompositeInstance { inner }
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType")
            .field("id", &self.inner.id)
            .field("name", &self.inner.parts.name)
            .field("generation", &self.inner.parts.generation)
            .field("dispatch", &self.inner.parts.dispatch)
            .finish()
    }
}

impl fmt::Display for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.parts.name)
    }
}

struct InstanceInner {
    composite: CompositeType,
    target: InstanceState,
    mixins: Vec<MixinInstance>,
}

/// State of one composed mixin inside a composite instance
pub struct MixinInstance {
    mixin_type: TypeRef,
    slot: usize,
    state: InstanceState,
    owner: Weak<InstanceInner>,
}

impl MixinInstance {
    /// The mixin type
    pub fn mixin_type(&self) -> &TypeRef {
        &self.mixin_type
    }

    /// Position in the composition order
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The mixin's fields
    pub fn state(&self) -> &InstanceState {
        &self.state
    }

    /// The composite instance this mixin belongs to
    ///
    /// # Errors
    ///
    /// [`InvocationError::OwnerDropped`] once every handle to the owner is gone.
    pub fn owner(&self) -> InvocationResult<CompositeInstance> {
        self.owner
            .upgrade()
            .map(|inner| CompositeInstance { inner })
            .ok_or_else(|| InvocationError::OwnerDropped {
                mixin: self.mixin_type.name().to_string(),
            })
    }
}

impl fmt::Debug for MixinInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinInstance")
            .field("mixin_type", &self.mixin_type)
            .field("slot", &self.slot)
            .field("state", &self.state)
            .finish()
    }
}

/// Instance of a composite type
#[derive(Clone)]
pub struct CompositeInstance {
    inner: Arc<InstanceInner>,
}

impl CompositeInstance {
    /// The composite type
    pub fn composite_type(&self) -> &CompositeType {
        &self.inner.composite
    }

    /// Fields of the target part
    pub fn target_state(&self) -> &InstanceState {
        &self.inner.target
    }

    /// Mixin instances in composition order
    pub fn mixins(&self) -> &[MixinInstance] {
        &self.inner.mixins
    }

    /// Instance of a composed mixin
    pub fn mixin(&self, mixin_type: &TypeRef) -> Option<&MixinInstance> {
        self.inner.mixins.iter().find(|m| &m.mixin_type == mixin_type)
    }

    /// Whether both handles refer to the same instance
    pub fn same_instance(&self, other: &CompositeInstance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Call a member by name
    ///
    /// Target members are looked up first, then members of publicly
    /// introduced interfaces. The name must match exactly one signature
    /// within the first tier that has any match.
    ///
    /// # Errors
    ///
    /// [`InvocationError::MemberNotFound`], [`InvocationError::AmbiguousMember`]
    /// or whatever the member body returns.
    pub fn call(&self, name: &str, args: &[Value]) -> InvocationResult<Value> {
        let composite = self.composite_type();

        let targets: Vec<&DispatchEntry> = composite.dispatch_table().named(name).collect();
        match targets.as_slice() {
            [entry] => return dispatch::dispatch(self, entry, args),
            [] => {}
            many => {
                let candidates = many.iter().map(|e| e.signature().to_string()).collect();
                return Err(self.ambiguous(name, candidates));
            }
        }

        let introduced: Vec<(&InterfaceForwarder, &MemberSignature)> = composite
            .introduced_interfaces()
            .filter(|f| f.is_public())
            .flat_map(|f| f.named(name).map(move |sig| (f, sig)))
            .collect();
        match introduced.as_slice() {
            [(forwarder, signature)] => dispatch::forward(self, forwarder, signature, args),
            [] => Err(InvocationError::MemberNotFound {
                type_name: composite.name().to_string(),
                member: name.to_string(),
            }),
            many => {
                let candidates = many.iter().map(|(_, sig)| sig.to_string()).collect();
                Err(self.ambiguous(name, candidates))
            }
        }
    }

    /// Call a target member by exact signature
    pub fn call_signature(&self, signature: &MemberSignature, args: &[Value]) -> InvocationResult<Value> {
        let entry = self
            .composite_type()
            .dispatch_table()
            .get(signature)
            .ok_or_else(|| InvocationError::MemberNotFound {
                type_name: self.composite_type().name().to_string(),
                member: signature.to_string(),
            })?;
        dispatch::dispatch(self, entry, args)
    }

    /// View the instance as one of its interfaces
    ///
    /// Introduced interfaces forward to the owning mixin; interfaces the
    /// target implements dispatch through the override chains.
    pub fn as_interface(&self, interface: &TypeRef) -> Option<InterfaceView<'_>> {
        let composite = self.composite_type();
        if let Some(forwarder) = composite.introduced_interface(interface) {
            return Some(InterfaceView {
                instance: self,
                interface: interface.clone(),
                forwarder: Some(forwarder),
            });
        }
        composite.target_type().implements(interface).then(|| InterfaceView {
            instance: self,
            interface: interface.clone(),
            forwarder: None,
        })
    }

    fn ambiguous(&self, name: &str, candidates: Vec<String>) -> InvocationError {
        InvocationError::AmbiguousMember {
            type_name: self.composite_type().name().to_string(),
            member: name.to_string(),
            candidates,
        }
    }
}

impl fmt::Debug for CompositeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeInstance")
            .field("composite", &self.inner.composite.name())
            .field("target", &self.inner.target)
            .field("mixins", &self.inner.mixins)
            .finish()
    }
}

/// A composite instance seen through one interface
pub struct InterfaceView<'a> {
    instance: &'a CompositeInstance,
    interface: TypeRef,
    forwarder: Option<&'a InterfaceForwarder>,
}

impl<'a> InterfaceView<'a> {
    /// The interface
    pub fn interface(&self) -> &TypeRef {
        &self.interface
    }

    /// The underlying instance
    pub fn instance(&self) -> &'a CompositeInstance {
        self.instance
    }

    /// Whether calls forward to a mixin slot
    pub fn is_introduced(&self) -> bool {
        self.forwarder.is_some()
    }

    /// Call an interface member by name
    pub fn call(&self, name: &str, args: &[Value]) -> InvocationResult<Value> {
        let candidates: Vec<&MemberSignature> = self
            .interface
            .members_named(name)
            .map(|m| &m.signature)
            .collect();
        match candidates.as_slice() {
            [signature] => self.call_signature(signature, args),
            [] => Err(InvocationError::MemberNotFound {
                type_name: self.interface.name().to_string(),
                member: name.to_string(),
            }),
            many => Err(InvocationError::AmbiguousMember {
                type_name: self.interface.name().to_string(),
                member: name.to_string(),
                candidates: many.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Call an interface member by exact signature
    pub fn call_signature(&self, signature: &MemberSignature, args: &[Value]) -> InvocationResult<Value> {
        if self.interface.find_member(signature).is_none() {
            return Err(InvocationError::MemberNotFound {
                type_name: self.interface.name().to_string(),
                member: signature.to_string(),
            });
        }
        match self.forwarder {
            Some(forwarder) => dispatch::forward(self.instance, forwarder, signature, args),
            None => self.instance.call_signature(signature, args),
        }
    }
}

impl fmt::Debug for InterfaceView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceView")
            .field("interface", &self.interface)
            .field("introduced", &self.forwarder.is_some())
            .finish()
    }
}

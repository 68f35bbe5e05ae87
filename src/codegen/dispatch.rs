// Copyright 2025 Cowboy AI, LLC.

//! Dispatch table and base-call continuations
//!
//! Each target member owns a [`DispatchEntry`]: the target's original body
//! plus the chain of mixin overrides in composition order. Calling the member
//! runs the **last** chain link first, so the mixin composed latest is the
//! outermost decorator. A link's [`Invocation::base`] continues with the
//! next-earlier link and, once the chain is exhausted, with the target's
//! original body.
//!
//! ```mermaid
//! graph LR
//!     Call --> M2[M2 override]
//!     M2 -->|base| M1[M1 override]
//!     M1 -->|base| T[T original]
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use super::composite::CompositeInstance;
use crate::errors::{InvocationError, InvocationResult};
use crate::types::{InstanceState, MemberBody, MemberSignature, TypeRef};

/// One override in a dispatch chain
#[derive(Clone)]
pub struct ChainLink {
    slot: usize,
    mixin_type: TypeRef,
    body: MemberBody,
}

impl ChainLink {
    pub(crate) fn new(slot: usize, mixin_type: TypeRef, body: MemberBody) -> Self {
        Self {
            slot,
            mixin_type,
            body,
        }
    }

    /// Mixin slot the override runs against
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The overriding mixin
    pub fn mixin_type(&self) -> &TypeRef {
        &self.mixin_type
    }
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLink")
            .field("slot", &self.slot)
            .field("mixin_type", &self.mixin_type)
            .finish()
    }
}

/// Dispatch data for one target member
#[derive(Clone)]
pub struct DispatchEntry {
    signature: MemberSignature,
    original: MemberBody,
    chain: Vec<ChainLink>,
}

impl DispatchEntry {
    pub(crate) fn new(signature: MemberSignature, original: MemberBody, chain: Vec<ChainLink>) -> Self {
        Self {
            signature,
            original,
            chain,
        }
    }

    /// Member signature
    pub fn signature(&self) -> &MemberSignature {
        &self.signature
    }

    /// Overrides in composition order; the last one is called first
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    /// Whether any mixin overrides the member
    pub fn is_overridden(&self) -> bool {
        !self.chain.is_empty()
    }

    /// Mixin called first, if any
    pub fn head(&self) -> Option<&TypeRef> {
        self.chain.last().map(ChainLink::mixin_type)
    }
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("signature", &self.signature.to_string())
            .field("chain", &self.chain)
            .finish()
    }
}

/// Dispatch entries for every target member, in target declaration order
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: IndexMap<MemberSignature, DispatchEntry>,
}

impl DispatchTable {
    pub(crate) fn insert(&mut self, entry: DispatchEntry) {
        self.entries.insert(entry.signature.clone(), entry);
    }

    /// Entry for a signature
    pub fn get(&self, signature: &MemberSignature) -> Option<&DispatchEntry> {
        self.entries.get(signature)
    }

    /// Entries whose member name matches
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DispatchEntry> + 'a {
        self.entries.values().filter(move |e| e.signature.name() == name)
    }

    /// Every entry
    pub fn iter(&self) -> impl Iterator<Item = &DispatchEntry> {
        self.entries.values()
    }

    /// Entries with at least one override
    pub fn overridden(&self) -> impl Iterator<Item = &DispatchEntry> {
        self.entries.values().filter(|e| e.is_overridden())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Forwarding of one introduced interface to its owning mixin slot
#[derive(Clone)]
pub struct InterfaceForwarder {
    interface: TypeRef,
    slot: usize,
    mixin_type: TypeRef,
    public: bool,
    members: IndexMap<MemberSignature, MemberBody>,
}

impl InterfaceForwarder {
    pub(crate) fn new(
        interface: TypeRef,
        slot: usize,
        mixin_type: TypeRef,
        public: bool,
        members: IndexMap<MemberSignature, MemberBody>,
    ) -> Self {
        Self {
            interface,
            slot,
            mixin_type,
            public,
            members,
        }
    }

    /// The introduced interface
    pub fn interface(&self) -> &TypeRef {
        &self.interface
    }

    /// Slot of the owning mixin
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The owning mixin
    pub fn mixin_type(&self) -> &TypeRef {
        &self.mixin_type
    }

    /// Whether members are also reachable by name on the composite
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Forwarded member signatures
    pub fn signatures(&self) -> impl Iterator<Item = &MemberSignature> {
        self.members.keys()
    }

    /// Forwarded signatures with the given member name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberSignature> + 'a {
        self.members.keys().filter(move |s| s.name() == name)
    }
}

impl fmt::Debug for InterfaceForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceForwarder")
            .field("interface", &self.interface)
            .field("slot", &self.slot)
            .field("mixin_type", &self.mixin_type)
            .field("public", &self.public)
            .field("members", &self.members.len())
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Frame<'a> {
    /// Running chain link `position` of `entry`
    Link {
        entry: &'a DispatchEntry,
        position: usize,
    },
    /// Running the target's original body
    Original { entry: &'a DispatchEntry },
    /// Running a forwarded interface member on a mixin slot
    Forwarded {
        signature: &'a MemberSignature,
        slot: usize,
    },
}

/// The call frame a member body runs in
///
/// Gives the body access to the composite instance, the state of the type
/// that declared the body, and the base-call continuation.
pub struct Invocation<'a> {
    instance: &'a CompositeInstance,
    frame: Frame<'a>,
}

impl<'a> Invocation<'a> {
    /// The composite instance; calls made through it dispatch from the top
    pub fn this(&self) -> &'a CompositeInstance {
        self.instance
    }

    /// Signature of the running member
    pub fn signature(&self) -> &'a MemberSignature {
        match self.frame {
            Frame::Link { entry, .. } | Frame::Original { entry } => &entry.signature,
            Frame::Forwarded { signature, .. } => signature,
        }
    }

    /// Fields of the target part of the instance
    pub fn target_state(&self) -> &'a InstanceState {
        self.instance.target_state()
    }

    /// Fields of the mixin running this body; `None` inside the target's body
    pub fn mixin_state(&self) -> Option<&'a InstanceState> {
        self.slot()
            .and_then(|slot| self.instance.mixins().get(slot))
            .map(|m| m.state())
    }

    /// Mixin running this body; `None` inside the target's body
    pub fn mixin_type(&self) -> Option<&'a TypeRef> {
        self.slot()
            .and_then(|slot| self.instance.mixins().get(slot))
            .map(|m| m.mixin_type())
    }

    /// Whether [`base`](Self::base) has somewhere to go
    pub fn has_base(&self) -> bool {
        matches!(self.frame, Frame::Link { .. })
    }

    /// Continue with the next-earlier override, or the target's original body
    ///
    /// # Errors
    ///
    /// [`InvocationError::NoBaseImplementation`] inside the target's original
    /// body or a forwarded interface member; otherwise whatever the next body
    /// returns.
    pub fn base(&self, args: &[Value]) -> InvocationResult<Value> {
        match self.frame {
            Frame::Link { entry, position } => {
                let next = if position == 0 {
                    Frame::Original { entry }
                } else {
                    Frame::Link {
                        entry,
                        position: position - 1,
                    }
                };
                run(self.instance, next, args)
            }
            Frame::Original { .. } | Frame::Forwarded { .. } => {
                Err(InvocationError::NoBaseImplementation {
                    member: self.signature().to_string(),
                })
            }
        }
    }

    fn slot(&self) -> Option<usize> {
        match self.frame {
            Frame::Link { entry, position } => Some(entry.chain[position].slot),
            Frame::Original { .. } => None,
            Frame::Forwarded { slot, .. } => Some(slot),
        }
    }
}

fn check_arity(signature: &MemberSignature, args: &[Value]) -> InvocationResult<()> {
    if args.len() == signature.arity() {
        Ok(())
    } else {
        Err(InvocationError::InvalidArguments {
            member: signature.to_string(),
            reason: format!("expected {} argument(s), got {}", signature.arity(), args.len()),
        })
    }
}

fn run(instance: &CompositeInstance, frame: Frame<'_>, args: &[Value]) -> InvocationResult<Value> {
    let body = match frame {
        Frame::Link { entry, position } => &entry.chain[position].body,
        Frame::Original { entry } => &entry.original,
        Frame::Forwarded { signature, .. } => {
            return Err(InvocationError::NoBaseImplementation {
                member: signature.to_string(),
            })
        }
    };
    let invocation = Invocation { instance, frame };
    body(&invocation, args)
}

/// Call a target member from the head of its chain
pub(crate) fn dispatch(
    instance: &CompositeInstance,
    entry: &DispatchEntry,
    args: &[Value],
) -> InvocationResult<Value> {
    check_arity(&entry.signature, args)?;
    let frame = match entry.chain.len() {
        0 => Frame::Original { entry },
        len => Frame::Link {
            entry,
            position: len - 1,
        },
    };
    run(instance, frame, args)
}

/// Call an introduced interface member on its owning mixin slot
pub(crate) fn forward(
    instance: &CompositeInstance,
    forwarder: &InterfaceForwarder,
    signature: &MemberSignature,
    args: &[Value],
) -> InvocationResult<Value> {
    let (signature, body) = forwarder
        .members
        .get_key_value(signature)
        .ok_or_else(|| InvocationError::MemberNotFound {
            type_name: forwarder.interface.name().to_string(),
            member: signature.to_string(),
        })?;
    check_arity(signature, args)?;
    let invocation = Invocation {
        instance,
        frame: Frame::Forwarded {
            signature,
            slot: forwarder.slot,
        },
    };
    body(&invocation, args)
}

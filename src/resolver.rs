use serde::{Deserialize, Serialize};

use crate::node::Attributes;

/// What the component registry knows about a tag name: the actor reference
/// that will render instances of it, and the attribute defaults merged under
/// the call site's own attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBinding<A> {
    pub actor: A,
    pub default_attributes: Attributes,
}

/// External component registry, injected into [`parse`](crate::parse).
///
/// Consulted once per parsed element, by tag name: a hit turns the element
/// into an [`ActorSlot`](crate::Node::ActorSlot), a miss leaves it a plain
/// element. Lookups are assumed synchronous, total, and side-effect-free
/// over tag names, which keeps parsing a pure function of its inputs.
pub trait ComponentResolver {
    /// Opaque reference to the actor/process that renders this component.
    type ActorRef: Clone;

    fn lookup(&self, tag: &str) -> Option<ComponentBinding<Self::ActorRef>>;
}

/// Resolver that resolves nothing: every tag parses as a plain element.
/// Useful for syntax checking and for templates without components.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoComponents;

impl ComponentResolver for NoComponents {
    type ActorRef = ();

    fn lookup(&self, _tag: &str) -> Option<ComponentBinding<()>> {
        None
    }
}

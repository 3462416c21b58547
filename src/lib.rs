//! # SlotML — markup templates with live actor slots
//!
//! A constrained HTML-like markup language parsed into an immutable
//! document tree, then rendered into abstract UI output with two kinds of
//! late-bound content resolved on the way:
//!
//! - **Actor slots**: tag names known to an injected [`ComponentResolver`]
//!   become [`ActorSlot`](Node::ActorSlot) nodes with a content-hash
//!   identity; at render time each slot's id is looked up in a
//!   caller-supplied instance map and the live actor's output is
//!   substituted, with placeholder markup as the unmounted fallback.
//! - **`#[token]` placeholders**: interpolated against a runtime
//!   dictionary in every text node and attribute value.
//!
//! ## Example
//! ```ignore
//! use slotml::{parse, render_with_interpolation, NoComponents};
//! use std::collections::HashMap;
//!
//! let template = parse(&NoComponents, r#"<div class="hud">Hello #[user]</div>"#)?;
//! let output = render_with_interpolation(
//!     &HashMap::new(),
//!     &HashMap::from([("user".to_string(), "ada".to_string())]),
//!     |_: &()| None,
//!     &template,
//! );
//! ```
//!
//! Parsing and rendering are synchronous pure functions over their inputs;
//! concurrent callers working on independent templates need no
//! coordination.

pub mod entities;
pub mod error;
pub mod interp;
pub mod node;
pub mod parser;
pub mod render;
pub mod resolver;
pub mod template;

// --- Core types ---
pub use error::{ParseError, SlotmlResult};
pub use node::{Attributes, Node, VOID_ELEMENTS};
pub use render::OutputNode;
pub use resolver::{ComponentBinding, ComponentResolver, NoComponents};
pub use template::Template;

use std::collections::HashMap;

/// Parse a markup string into a [`Template`], deciding Element vs.
/// ActorSlot through `resolver`. All-or-nothing: any grammar violation
/// returns a [`ParseError`] and no partial tree.
pub fn parse<R: ComponentResolver>(
    resolver: &R,
    text: &str,
) -> SlotmlResult<Template<R::ActorRef>> {
    parser::parse(resolver, text)
}

/// Render a template with an empty interpolation dictionary.
pub fn render<A, F>(
    instances: &HashMap<String, A>,
    render_actor: F,
    template: &Template<A>,
) -> Vec<OutputNode>
where
    F: Fn(&A) -> Option<OutputNode>,
{
    render::render(instances, render_actor, template)
}

/// Render a template, resolving actor slots through `instances` +
/// `render_actor` and `#[token]` placeholders through `dictionary`.
pub fn render_with_interpolation<A, F>(
    instances: &HashMap<String, A>,
    dictionary: &HashMap<String, String>,
    render_actor: F,
    template: &Template<A>,
) -> Vec<OutputNode>
where
    F: Fn(&A) -> Option<OutputNode>,
{
    render::render_with_interpolation(instances, dictionary, render_actor, template)
}

/// Substitute `#[token]` placeholders in a bare string. Unknown keys fall
/// back to the bare token text; text without placeholders is untouched.
pub fn interpolate(dictionary: &HashMap<String, String>, text: &str) -> String {
    interp::interpolate(dictionary, text)
}

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Ordered attribute list. Order is the order of appearance in markup;
/// merges are last-write-wins by key.
pub type Attributes = Vec<(String, String)>;

/// Element names that never carry children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input", "link", "meta"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// One parsed unit of the markup tree.
///
/// Generic over `A`, the opaque actor-reference type handed out by the
/// [`ComponentResolver`](crate::ComponentResolver). Names are always
/// lower-cased by the parser, and void elements never carry children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node<A> {
    /// Literal text, character references already decoded.
    Text(String),
    /// A plain element: no component resolved for its tag name.
    Element {
        name: String,
        attributes: Attributes,
        children: Vec<Node<A>>,
    },
    /// A mount point for a live component.
    ///
    /// `id` is the hex SHA-256 digest of the canonical serialization of the
    /// plain Element form as written at the call site, computed *before*
    /// component defaults are merged into `attributes`. It is derived, never
    /// assigned, and stable exactly as long as the raw markup is unchanged.
    ActorSlot {
        actor: A,
        name: String,
        id: String,
        attributes: Attributes,
        children: Vec<Node<A>>,
    },
}

impl<A> Node<A> {
    /// Canonical re-serialization of this node.
    ///
    /// Text is emitted unescaped; elements and actor slots are emitted as
    /// `<name attr="value" ...>children</name>`, with the self-closing form
    /// for void-element names. Attribute values are double-quoted without
    /// internal escaping, so values containing `"` are not round-trip safe.
    /// This is a documented limitation, not a defect.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.serialize_into(&mut out);
        out
    }

    fn serialize_into(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(content),
            Node::Element {
                name,
                attributes,
                children,
            }
            | Node::ActorSlot {
                name,
                attributes,
                children,
                ..
            } => {
                serialize_tag_into(name, attributes, children, out);
            }
        }
    }
}

fn serialize_tag_into<A>(
    name: &str,
    attributes: &Attributes,
    children: &[Node<A>],
    out: &mut String,
) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    if is_void_element(name) {
        out.push_str("/>");
    } else {
        out.push('>');
        for child in children {
            child.serialize_into(out);
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

/// Serialize a sequence of sibling nodes.
pub fn serialize_nodes<A>(nodes: &[Node<A>]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.serialize_into(&mut out);
    }
    out
}

/// Content-hash identity for an actor slot: the hex SHA-256 digest of the
/// canonical serialization of the plain, pre-merge Element form.
pub(crate) fn identity_hash<A>(
    name: &str,
    attributes: &Attributes,
    children: &[Node<A>],
) -> String {
    let mut canonical = String::new();
    serialize_tag_into(name, attributes, children, &mut canonical);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Merge `defaults` under `parsed`: parsed attributes keep their order and
/// win on key collision; defaults without a parsed counterpart are appended
/// in their own order.
pub(crate) fn merge_attributes(parsed: Attributes, defaults: &Attributes) -> Attributes {
    let mut merged = parsed;
    for (key, value) in defaults {
        if !merged.iter().any(|(k, _)| k == key) {
            merged.push((key.clone(), value.clone()));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Node<()> {
        Node::Text(s.to_string())
    }

    #[test]
    fn serialize_element_with_attributes_and_children() {
        let node: Node<()> = Node::Element {
            name: "div".to_string(),
            attributes: vec![("class".to_string(), "card".to_string())],
            children: vec![text("hi")],
        };
        assert_eq!(node.serialize(), r#"<div class="card">hi</div>"#);
    }

    #[test]
    fn serialize_void_element_self_closes() {
        let node: Node<()> = Node::Element {
            name: "img".to_string(),
            attributes: vec![("src".to_string(), "a.png".to_string())],
            children: vec![],
        };
        assert_eq!(node.serialize(), r#"<img src="a.png"/>"#);
    }

    #[test]
    fn merge_keeps_parsed_attributes_on_collision() {
        let parsed = vec![("class".to_string(), "mine".to_string())];
        let defaults = vec![
            ("class".to_string(), "theirs".to_string()),
            ("role".to_string(), "button".to_string()),
        ];
        let merged = merge_attributes(parsed, &defaults);
        assert_eq!(
            merged,
            vec![
                ("class".to_string(), "mine".to_string()),
                ("role".to_string(), "button".to_string()),
            ]
        );
    }

    #[test]
    fn identity_hash_is_deterministic_and_attribute_sensitive() {
        let attrs_a = vec![("href".to_string(), "/a".to_string())];
        let attrs_b = vec![("href".to_string(), "/b".to_string())];
        let none: Vec<Node<()>> = vec![];
        assert_eq!(
            identity_hash("x-link", &attrs_a, &none),
            identity_hash("x-link", &attrs_a, &none)
        );
        assert_ne!(
            identity_hash("x-link", &attrs_a, &none),
            identity_hash("x-link", &attrs_b, &none)
        );
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::interp::interpolate;
use crate::node::{Attributes, Node};
use crate::template::Template;

/// Abstract output handed to the host UI layer.
///
/// `class` attributes are split into `classes` (the host toolkit's class
/// mechanism); every other attribute passes through generically. Values have
/// already been interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputNode {
    Text(String),
    Element {
        name: String,
        classes: Vec<String>,
        attributes: Attributes,
        children: Vec<OutputNode>,
    },
}

/// Render a template without interpolation (an empty dictionary).
///
/// `instances` maps slot ids to live actor references; `render_actor` asks
/// the runtime for an actor's current output. Either step coming back empty
/// means "no live instance" and the slot falls back to placeholder markup.
pub fn render<A, F>(
    instances: &HashMap<String, A>,
    render_actor: F,
    template: &Template<A>,
) -> Vec<OutputNode>
where
    F: Fn(&A) -> Option<OutputNode>,
{
    render_with_interpolation(instances, &HashMap::new(), render_actor, template)
}

/// Render a template, substituting actor slots and `#[token]` placeholders.
///
/// Pure tree walk: no shared state, no I/O. The render callback may recurse
/// into this renderer for nested templates. Rendering never fails; missing
/// instances, unknown actors, and unknown tokens all have lossless
/// fallbacks.
pub fn render_with_interpolation<A, F>(
    instances: &HashMap<String, A>,
    dictionary: &HashMap<String, String>,
    render_actor: F,
    template: &Template<A>,
) -> Vec<OutputNode>
where
    F: Fn(&A) -> Option<OutputNode>,
{
    let ctx = RenderContext {
        instances,
        dictionary,
        render_actor: &render_actor,
    };
    render_nodes(&ctx, template.nodes())
}

struct RenderContext<'a, A, F> {
    instances: &'a HashMap<String, A>,
    dictionary: &'a HashMap<String, String>,
    render_actor: &'a F,
}

fn render_nodes<A, F>(ctx: &RenderContext<'_, A, F>, nodes: &[Node<A>]) -> Vec<OutputNode>
where
    F: Fn(&A) -> Option<OutputNode>,
{
    nodes.iter().map(|node| render_node(ctx, node)).collect()
}

fn render_node<A, F>(ctx: &RenderContext<'_, A, F>, node: &Node<A>) -> OutputNode
where
    F: Fn(&A) -> Option<OutputNode>,
{
    match node {
        Node::Text(content) => OutputNode::Text(interpolate(ctx.dictionary, content)),
        Node::Element {
            name,
            attributes,
            children,
        } => render_element(ctx, name, attributes, children),
        Node::ActorSlot {
            name, id, children, ..
        } => {
            let live = ctx
                .instances
                .get(id)
                .and_then(|actor| (ctx.render_actor)(actor));
            match live {
                // The live actor owns its rendering; the slot's own
                // attributes and fallback children are irrelevant.
                Some(output) => output,
                // Unmounted: placeholder carrying exactly the slot name and
                // id. Original attributes are dropped, not merged.
                None => OutputNode::Element {
                    name: "div".to_string(),
                    classes: Vec::new(),
                    attributes: vec![
                        ("data-x-name".to_string(), name.clone()),
                        ("data-x-id".to_string(), id.clone()),
                    ],
                    children: render_nodes(ctx, children),
                },
            }
        }
    }
}

fn render_element<A, F>(
    ctx: &RenderContext<'_, A, F>,
    name: &str,
    attributes: &Attributes,
    children: &[Node<A>],
) -> OutputNode
where
    F: Fn(&A) -> Option<OutputNode>,
{
    let mut classes = Vec::new();
    let mut passthrough = Vec::new();
    for (key, value) in attributes {
        let value = interpolate(ctx.dictionary, value);
        if key == "class" {
            classes.extend(value.split_whitespace().map(str::to_string));
        } else {
            passthrough.push((key.clone(), value));
        }
    }
    OutputNode::Element {
        name: name.to_string(),
        classes,
        attributes: passthrough,
        children: render_nodes(ctx, children),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::resolver::{ComponentBinding, ComponentResolver, NoComponents};
    use pretty_assertions::assert_eq;

    struct PanelResolver;

    impl ComponentResolver for PanelResolver {
        type ActorRef = u32;

        fn lookup(&self, tag: &str) -> Option<ComponentBinding<u32>> {
            (tag == "x-panel").then(|| ComponentBinding {
                actor: 7,
                default_attributes: vec![("class".to_string(), "panel".to_string())],
            })
        }
    }

    fn slot_id(template: &Template<u32>) -> String {
        match &template.nodes()[0] {
            Node::ActorSlot { id, .. } => id.clone(),
            other => panic!("expected actor slot, got {:?}", other),
        }
    }

    #[test]
    fn text_and_attribute_values_are_interpolated() {
        let template = parse(&NoComponents, r##"<p title="#[title]">Hi #[user]</p>"##).unwrap();
        let dict: HashMap<String, String> = [
            ("title".to_string(), "Greeting".to_string()),
            ("user".to_string(), "ada".to_string()),
        ]
        .into_iter()
        .collect();
        let output =
            render_with_interpolation(&HashMap::new(), &dict, |_: &()| None, &template);
        assert_eq!(
            output,
            vec![OutputNode::Element {
                name: "p".to_string(),
                classes: vec![],
                attributes: vec![("title".to_string(), "Greeting".to_string())],
                children: vec![OutputNode::Text("Hi ada".to_string())],
            }]
        );
    }

    #[test]
    fn class_attribute_maps_to_classes() {
        let template = parse(&NoComponents, r#"<div class="a  b" id="x"></div>"#).unwrap();
        let output = render(&HashMap::new(), |_: &()| None, &template);
        assert_eq!(
            output,
            vec![OutputNode::Element {
                name: "div".to_string(),
                classes: vec!["a".to_string(), "b".to_string()],
                attributes: vec![("id".to_string(), "x".to_string())],
                children: vec![],
            }]
        );
    }

    #[test]
    fn live_slot_emits_actor_output_verbatim() {
        let template =
            parse(&PanelResolver, r#"<x-panel class="mine">fallback</x-panel>"#).unwrap();
        let id = slot_id(&template);
        let instances: HashMap<String, u32> = [(id, 7u32)].into_iter().collect();
        let output = render(
            &instances,
            |actor: &u32| Some(OutputNode::Text(format!("live:{}", actor))),
            &template,
        );
        assert_eq!(output, vec![OutputNode::Text("live:7".to_string())]);
    }

    #[test]
    fn unmounted_slot_renders_placeholder_with_only_data_attributes() {
        let template =
            parse(&PanelResolver, r#"<x-panel class="mine"><p>inner</p></x-panel>"#).unwrap();
        let id = slot_id(&template);
        // id absent from the instance map
        let output = render(&HashMap::new(), |_: &u32| None, &template);
        assert_eq!(
            output,
            vec![OutputNode::Element {
                name: "div".to_string(),
                classes: vec![],
                attributes: vec![
                    ("data-x-name".to_string(), "x-panel".to_string()),
                    ("data-x-id".to_string(), id),
                ],
                children: vec![OutputNode::Element {
                    name: "p".to_string(),
                    classes: vec![],
                    attributes: vec![],
                    children: vec![OutputNode::Text("inner".to_string())],
                }],
            }]
        );
    }

    #[test]
    fn mounted_instance_with_silent_actor_still_falls_back() {
        let template = parse(&PanelResolver, "<x-panel></x-panel>").unwrap();
        let id = slot_id(&template);
        let instances: HashMap<String, u32> = [(id, 7u32)].into_iter().collect();
        // The callback declines; placeholder path applies.
        let output = render(&instances, |_: &u32| None, &template);
        match &output[0] {
            OutputNode::Element { attributes, .. } => {
                assert_eq!(attributes[0].0, "data-x-name")
            }
            other => panic!("expected placeholder element, got {:?}", other),
        }
    }
}

use pretty_assertions::assert_eq;
use slotml::{
    interpolate, parse, render, render_with_interpolation, ComponentBinding, ComponentResolver,
    Node, NoComponents, OutputNode, ParseError, Template,
};
use std::collections::HashMap;

/// Registry with two components, the shape a host embeds this crate with.
struct Registry;

impl ComponentResolver for Registry {
    type ActorRef = &'static str;

    fn lookup(&self, tag: &str) -> Option<ComponentBinding<&'static str>> {
        match tag {
            "x-clock" => Some(ComponentBinding {
                actor: "clock",
                default_attributes: vec![("class".to_string(), "clock".to_string())],
            }),
            "x-inventory" => Some(ComponentBinding {
                actor: "inventory",
                default_attributes: vec![],
            }),
            _ => None,
        }
    }
}

fn first_slot_id<A>(template: &Template<A>) -> String {
    fn walk<A>(nodes: &[Node<A>]) -> Option<String> {
        for node in nodes {
            match node {
                Node::ActorSlot { id, .. } => return Some(id.clone()),
                Node::Element { children, .. } => {
                    if let Some(id) = walk(children) {
                        return Some(id);
                    }
                }
                Node::Text(_) => {}
            }
        }
        None
    }
    walk(template.nodes()).expect("template contains no actor slot")
}

// ─── Parsing ─────────────────────────────────────────────────────────────

#[test]
fn parses_a_realistic_page() {
    let markup = r#"
        <div class="hud">
            <!-- status bar -->
            <h1>Station #[station.name]</h1>
            <img src="logo.png">
            <x-clock format="utc"></x-clock>
            <p>Signal: &gt;90% &amp; holding</p>
        </div>
    "#;
    let template = parse(&Registry, markup).unwrap();
    assert_eq!(template.len(), 1);
    match &template.nodes()[0] {
        Node::Element { name, children, .. } => {
            assert_eq!(name, "div");
            // comment elided, whitespace between tags elided
            assert_eq!(children.len(), 4);
        }
        other => panic!("expected element, got {:?}", other),
    }
}

#[test]
fn empty_input_short_circuits() {
    assert!(parse(&NoComponents, "").unwrap().is_empty());
}

#[test]
fn whitespace_only_element_body_has_no_children() {
    let template = parse(&NoComponents, "<div>   </div>").unwrap();
    match &template.nodes()[0] {
        Node::Element { children, .. } => assert!(children.is_empty()),
        other => panic!("expected element, got {:?}", other),
    }
}

#[test]
fn img_is_childless_with_or_without_trailing_slash() {
    for markup in [r#"<img src="a.png">"#, r#"<img src="a.png" />"#] {
        let template = parse(&NoComponents, markup).unwrap();
        match &template.nodes()[0] {
            Node::Element { name, children, .. } => {
                assert_eq!(name, "img");
                assert!(children.is_empty());
            }
            other => panic!("expected element, got {:?}", other),
        }
    }
}

#[test]
fn tag_mismatch_error_names_the_unclosed_element() {
    let err = parse(&NoComponents, "<div><span></div>").unwrap_err();
    assert!(err.to_string().contains("span"), "error was: {}", err);
}

#[test]
fn closing_tag_match_is_case_insensitive() {
    assert!(parse(&NoComponents, "<Div>x</DIV>").is_ok());
}

#[test]
fn entity_decoding_matrix() {
    let cases = [
        ("&amp;", "&"),
        ("&#65;", "A"),
        ("&#x41;", "A"),
        ("&zzzzz;", "&zzzzz;"),
        ("&copy; 2026", "\u{a9} 2026"),
    ];
    for (markup, expected) in cases {
        let template = parse(&NoComponents, &format!("<p>{}</p>", markup)).unwrap();
        match &template.nodes()[0] {
            Node::Element { children, .. } => {
                assert_eq!(children, &vec![Node::Text(expected.to_string())], "{}", markup)
            }
            other => panic!("expected element, got {:?}", other),
        }
    }
}

#[test]
fn malformed_numeric_reference_is_all_or_nothing() {
    let err = parse(&NoComponents, "<p>fine until &#xQQ; here</p>").unwrap_err();
    assert!(matches!(err, ParseError::BadNumericReference { .. }));
}

#[test]
fn round_trip_through_canonical_serialization() {
    let markup = concat!(
        r#"<section class="cargo"><h2>Manifest &amp; Notes</h2>"#,
        r#"<ul><li>ore</li><li>fuel</li></ul><hr/></section>"#
    );
    let template = parse(&NoComponents, markup).unwrap();
    let reparsed = parse(&NoComponents, &template.serialize()).unwrap();
    assert_eq!(template, reparsed);
}

// ─── Slot identity ───────────────────────────────────────────────────────

#[test]
fn slot_id_is_stable_for_identical_markup() {
    let a = parse(&Registry, r#"<x-clock format="utc"></x-clock>"#).unwrap();
    let b = parse(&Registry, r#"<x-clock format="utc"></x-clock>"#).unwrap();
    assert_eq!(first_slot_id(&a), first_slot_id(&b));
}

#[test]
fn slot_id_differs_when_call_site_attributes_differ() {
    let a = parse(&Registry, r#"<x-clock format="utc"></x-clock>"#).unwrap();
    let b = parse(&Registry, r#"<x-clock format="local"></x-clock>"#).unwrap();
    assert_ne!(first_slot_id(&a), first_slot_id(&b));
}

#[test]
fn default_attributes_merge_under_call_site_attributes() {
    let template = parse(&Registry, r#"<x-clock class="mine"></x-clock>"#).unwrap();
    match &template.nodes()[0] {
        Node::ActorSlot { attributes, .. } => {
            assert_eq!(attributes, &vec![("class".to_string(), "mine".to_string())]);
        }
        other => panic!("expected actor slot, got {:?}", other),
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────

#[test]
fn live_actor_output_replaces_the_slot() {
    let template = parse(&Registry, "<x-clock>fallback</x-clock>").unwrap();
    let id = first_slot_id(&template);
    let instances: HashMap<String, &'static str> = [(id, "clock")].into_iter().collect();
    let output = render(
        &instances,
        |actor: &&str| Some(OutputNode::Text(format!("<{}>", actor))),
        &template,
    );
    assert_eq!(output, vec![OutputNode::Text("<clock>".to_string())]);
}

#[test]
fn unmounted_slot_placeholder_has_exactly_the_data_attributes() {
    let template =
        parse(&Registry, r#"<x-inventory slot="main"><p>loading</p></x-inventory>"#).unwrap();
    let id = first_slot_id(&template);
    let output = render(&HashMap::new(), |_: &&str| None, &template);
    assert_eq!(
        output,
        vec![OutputNode::Element {
            name: "div".to_string(),
            classes: vec![],
            attributes: vec![
                ("data-x-name".to_string(), "x-inventory".to_string()),
                ("data-x-id".to_string(), id),
            ],
            children: vec![OutputNode::Element {
                name: "p".to_string(),
                classes: vec![],
                attributes: vec![],
                children: vec![OutputNode::Text("loading".to_string())],
            }],
        }]
    );
}

#[test]
fn interpolation_reaches_text_and_attributes_but_not_names() {
    let template = parse(
        &NoComponents,
        r#"<a href="/users/#[user.id]" class="link #[tone]">#[user.name]</a>"#,
    )
    .unwrap();
    let dict: HashMap<String, String> = [
        ("user.id".to_string(), "42".to_string()),
        ("user.name".to_string(), "Ada".to_string()),
        ("tone".to_string(), "bright".to_string()),
    ]
    .into_iter()
    .collect();
    let output = render_with_interpolation(&HashMap::new(), &dict, |_: &()| None, &template);
    assert_eq!(
        output,
        vec![OutputNode::Element {
            name: "a".to_string(),
            classes: vec!["link".to_string(), "bright".to_string()],
            attributes: vec![("href".to_string(), "/users/42".to_string())],
            children: vec![OutputNode::Text("Ada".to_string())],
        }]
    );
}

#[test]
fn interpolate_empty_dictionary_emits_bare_tokens() {
    assert_eq!(interpolate(&HashMap::new(), "Hello #[user]"), "Hello user");
}

#[test]
fn interpolation_is_a_no_op_without_placeholders() {
    let dict: HashMap<String, String> =
        [("user".to_string(), "ada".to_string())].into_iter().collect();
    let text = "plain text, even with # and [brackets]";
    assert_eq!(interpolate(&dict, text), text);
}

#[test]
fn render_callback_may_recurse_into_the_renderer() {
    // The clock actor renders a nested template of its own; re-entrant calls
    // must work without any coordination.
    let outer = parse(&Registry, "<x-clock></x-clock>").unwrap();
    let id = first_slot_id(&outer);
    let instances: HashMap<String, &'static str> = [(id, "clock")].into_iter().collect();

    let output = render(
        &instances,
        |_: &&str| {
            let inner = parse(&NoComponents, "<time>12:00</time>").unwrap();
            render(&HashMap::new(), |_: &()| None, &inner).into_iter().next()
        },
        &outer,
    );
    assert_eq!(
        output,
        vec![OutputNode::Element {
            name: "time".to_string(),
            classes: vec![],
            attributes: vec![],
            children: vec![OutputNode::Text("12:00".to_string())],
        }]
    );
}

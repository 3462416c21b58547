use crate::entities;
use crate::error::{ParseError, SlotmlResult};
use crate::node::{identity_hash, is_void_element, merge_attributes, Attributes, Node};
use crate::resolver::ComponentResolver;
use crate::template::Template;

/// Parse a markup string into a [`Template`].
///
/// The resolver is consulted once per parsed element, by tag name, to decide
/// between a plain `Element` and an `ActorSlot`. Parsing is all-or-nothing:
/// the first grammar violation aborts with a [`ParseError`] and no partial
/// tree is produced. Empty input short-circuits to an empty template.
pub fn parse<R: ComponentResolver>(
    resolver: &R,
    input: &str,
) -> SlotmlResult<Template<R::ActorRef>> {
    if input.is_empty() {
        return Ok(Template::new(Vec::new()));
    }
    let mut parser = Parser {
        input,
        pos: 0,
        resolver,
    };
    let nodes = parser.parse_nodes_until_end()?;
    Ok(Template::new(nodes))
}

struct Parser<'a, R> {
    input: &'a str,
    pos: usize,
    resolver: &'a R,
}

impl<'a, R: ComponentResolver> Parser<'a, R> {
    // ─── Cursor primitives ───────────────────────────────────────────────

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// 1-based line and column of the current position, for error reports.
    fn line_column(&self) -> (usize, usize) {
        let before = &self.input[..self.pos];
        let line = before.matches('\n').count() + 1;
        let column = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
        (line, column)
    }

    fn expect(&mut self, s: &str, description: &str) -> SlotmlResult<()> {
        if self.eat(s) {
            Ok(())
        } else if self.at_end() {
            Err(ParseError::UnexpectedEnd {
                context: description.to_string(),
            })
        } else {
            let (line, column) = self.line_column();
            Err(ParseError::Expected {
                expected: description.to_string(),
                line,
                column,
            })
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    fn parse_nodes_until_end(&mut self) -> SlotmlResult<Vec<Node<R::ActorRef>>> {
        let mut nodes = Vec::new();
        while !self.at_end() {
            if let Some(node) = self.parse_node()? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// One node production: comment, element, or text run. Comments and
    /// whitespace-only text runs are elided (`None`). Always consumes at
    /// least one character or fails.
    fn parse_node(&mut self) -> SlotmlResult<Option<Node<R::ActorRef>>> {
        if self.rest().starts_with("<!--") {
            self.parse_comment()?;
            return Ok(None);
        }
        if self.peek() == Some('<') {
            return self.parse_element().map(Some);
        }
        self.parse_text()
    }

    // ─── Comments ────────────────────────────────────────────────────────

    fn parse_comment(&mut self) -> SlotmlResult<()> {
        self.pos += "<!--".len();
        match self.rest().find("-->") {
            Some(offset) => {
                self.pos += offset + "-->".len();
                Ok(())
            }
            None => Err(ParseError::UnterminatedComment),
        }
    }

    // ─── Text runs ───────────────────────────────────────────────────────

    /// Longest run of characters excluding `<`, with character references
    /// decoded in place. A run whose trimmed content is empty is suppressed,
    /// so whitespace-only stretches between tags vanish.
    fn parse_text(&mut self) -> SlotmlResult<Option<Node<R::ActorRef>>> {
        let mut content = String::new();
        loop {
            match self.peek() {
                None | Some('<') => break,
                Some('&') => self.parse_char_ref_into(&mut content)?,
                Some(_) => {
                    let start = self.pos;
                    while let Some(c) = self.peek() {
                        if c == '<' || c == '&' {
                            break;
                        }
                        self.bump();
                    }
                    content.push_str(&self.input[start..self.pos]);
                }
            }
        }
        if content.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(Node::Text(content)))
        }
    }

    // ─── Character references ────────────────────────────────────────────

    /// Decode one reference at `&`, appending the result to `out`.
    ///
    /// `&name;` with an unknown name re-emits the literal `&name;`; a bare
    /// `&` that is not followed by a recognized form plus `;` is emitted
    /// literally. Only numeric references with malformed digits fail.
    fn parse_char_ref_into(&mut self, out: &mut String) -> SlotmlResult<()> {
        let after_amp = &self.rest()[1..];

        if let Some(after_hash) = after_amp.strip_prefix('#') {
            let hex = after_hash.starts_with('x') || after_hash.starts_with('X');
            let digits_str = if hex { &after_hash[1..] } else { after_hash };
            let digits_len = digits_str
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(digits_str.len());
            let digits = &digits_str[..digits_len];
            if digits_str[digits_len..].starts_with(';') {
                out.push(entities::decode_numeric(digits, hex)?);
                // '&' '#' [xX] digits ';'
                let prefix = if hex { 3 } else { 2 };
                self.pos += prefix + digits_len + 1;
                return Ok(());
            }
            // No terminating ';': not a numeric form, the '&' is literal.
            out.push('&');
            self.bump();
            return Ok(());
        }

        let name_len = after_amp
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_amp.len());
        let name = &after_amp[..name_len];
        if !name.is_empty() && after_amp[name_len..].starts_with(';') {
            match entities::lookup_named(name) {
                Some(text) => out.push_str(text),
                None => {
                    // Lossless: unknown names pass through unchanged.
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
            }
            self.pos += 1 + name_len + 1;
        } else {
            out.push('&');
            self.bump();
        }
        Ok(())
    }

    // ─── Elements ────────────────────────────────────────────────────────

    fn parse_element(&mut self) -> SlotmlResult<Node<R::ActorRef>> {
        self.expect("<", "'<' to open a tag")?;
        let name = self.parse_name("tag name")?;
        let attributes = self.parse_attributes()?;
        self.skip_whitespace();

        if is_void_element(&name) {
            // Void path: optional '/', then '>', never any children.
            self.eat("/");
            self.expect(">", &format!("'>' to close void element <{}>", name))?;
            return Ok(self.build_node(name, attributes, Vec::new()));
        }

        self.expect(">", &format!("'>' to close the <{}> opening tag", name))?;
        let children = self.parse_children(&name)?;
        self.parse_closing_tag(&name)?;
        Ok(self.build_node(name, attributes, children))
    }

    /// Tag and attribute names share a charset: everything except
    /// whitespace and `"'>/=`, case-folded to lowercase.
    fn parse_name(&mut self, description: &str) -> SlotmlResult<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=') {
                break;
            }
            self.bump();
        }
        if self.pos == start {
            if self.at_end() {
                return Err(ParseError::UnexpectedEnd {
                    context: description.to_string(),
                });
            }
            let (line, column) = self.line_column();
            return Err(ParseError::Expected {
                expected: description.to_string(),
                line,
                column,
            });
        }
        Ok(self.input[start..self.pos].to_lowercase())
    }

    fn parse_children(&mut self, name: &str) -> SlotmlResult<Vec<Node<R::ActorRef>>> {
        let mut children = Vec::new();
        loop {
            if self.at_end() {
                return Err(ParseError::MissingClosingTag {
                    name: name.to_string(),
                });
            }
            if self.rest().starts_with("</") {
                return Ok(children);
            }
            if let Some(node) = self.parse_node()? {
                children.push(node);
            }
        }
    }

    fn parse_closing_tag(&mut self, name: &str) -> SlotmlResult<()> {
        if !self.eat("</") {
            return Err(ParseError::MissingClosingTag {
                name: name.to_string(),
            });
        }
        let found = self.parse_name("closing tag name")?;
        self.skip_whitespace();
        self.expect(">", &format!("'>' to close the </{}> tag", found))?;
        // Both sides are lower-cased, so comparison is case-insensitive.
        if found != name {
            return Err(ParseError::TagMismatch {
                expected: name.to_string(),
                found,
            });
        }
        Ok(())
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    fn parse_attributes(&mut self) -> SlotmlResult<Attributes> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some('>') | Some('/') => return Ok(attributes),
                _ => {}
            }
            let name = self.parse_name("attribute name")?;
            let value = if self.eat("=") {
                self.parse_attribute_value()?
            } else {
                // Bare attribute: present with an empty value.
                String::new()
            };
            attributes.push((name, value));
        }
    }

    fn parse_attribute_value(&mut self) -> SlotmlResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_quoted_value(quote),
            _ => self.parse_unquoted_value(),
        }
    }

    fn parse_quoted_value(&mut self, quote: char) -> SlotmlResult<String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedAttributeValue { quote }),
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some('&') => self.parse_char_ref_into(&mut value)?,
                Some(_) => {
                    let start = self.pos;
                    while let Some(c) = self.peek() {
                        if c == quote || c == '&' {
                            break;
                        }
                        self.bump();
                    }
                    value.push_str(&self.input[start..self.pos]);
                }
            }
        }
    }

    fn parse_unquoted_value(&mut self) -> SlotmlResult<String> {
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('&') => self.parse_char_ref_into(&mut value)?,
                Some(c)
                    if !c.is_whitespace()
                        && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`') =>
                {
                    let start = self.pos;
                    while let Some(c) = self.peek() {
                        if c.is_whitespace()
                            || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`' | '&')
                        {
                            break;
                        }
                        self.bump();
                    }
                    value.push_str(&self.input[start..self.pos]);
                }
                _ => return Ok(value),
            }
        }
    }

    // ─── Component substitution ──────────────────────────────────────────

    /// Inline component substitution: if the resolver knows this tag name,
    /// the element becomes an `ActorSlot`. The slot id is hashed from the
    /// plain Element form *before* default attributes are merged in, so
    /// identity tracks the raw call-site markup, never the registry state.
    fn build_node(
        &self,
        name: String,
        attributes: Attributes,
        children: Vec<Node<R::ActorRef>>,
    ) -> Node<R::ActorRef> {
        match self.resolver.lookup(&name) {
            Some(binding) => {
                let id = identity_hash(&name, &attributes, &children);
                let attributes = merge_attributes(attributes, &binding.default_attributes);
                Node::ActorSlot {
                    actor: binding.actor,
                    name,
                    id,
                    attributes,
                    children,
                }
            }
            None => Node::Element {
                name,
                attributes,
                children,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ComponentBinding, NoComponents};
    use pretty_assertions::assert_eq;

    fn parse_plain(input: &str) -> SlotmlResult<Template<()>> {
        parse(&NoComponents, input)
    }

    struct WidgetResolver;

    impl ComponentResolver for WidgetResolver {
        type ActorRef = &'static str;

        fn lookup(&self, tag: &str) -> Option<ComponentBinding<&'static str>> {
            if tag == "x-widget" {
                Some(ComponentBinding {
                    actor: "widget-actor",
                    default_attributes: vec![
                        ("class".to_string(), "widget".to_string()),
                        ("role".to_string(), "group".to_string()),
                    ],
                })
            } else {
                None
            }
        }
    }

    #[test]
    fn empty_input_is_an_empty_template() {
        let template = parse_plain("").unwrap();
        assert!(template.is_empty());
    }

    #[test]
    fn whitespace_only_text_is_elided() {
        let template = parse_plain("<div>   </div>").unwrap();
        assert_eq!(
            template.nodes(),
            &[Node::Element {
                name: "div".to_string(),
                attributes: vec![],
                children: vec![],
            }]
        );
    }

    #[test]
    fn tag_names_are_lowercased() {
        let template = parse_plain("<DIV>x</dIv>").unwrap();
        match &template.nodes()[0] {
            Node::Element { name, .. } => assert_eq!(name, "div"),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn void_element_never_has_children_with_or_without_slash() {
        for input in [r#"<img src="a.png">"#, r#"<img src="a.png"/>"#] {
            let template = parse_plain(input).unwrap();
            assert_eq!(
                template.nodes(),
                &[Node::Element {
                    name: "img".to_string(),
                    attributes: vec![("src".to_string(), "a.png".to_string())],
                    children: vec![],
                }],
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn self_closing_non_void_element_is_rejected() {
        assert!(parse_plain("<div/>").is_err());
    }

    #[test]
    fn mismatched_closing_tag_names_the_open_element() {
        let err = parse_plain("<div><span></div>").unwrap_err();
        assert_eq!(
            err,
            ParseError::TagMismatch {
                expected: "span".to_string(),
                found: "div".to_string(),
            }
        );
    }

    #[test]
    fn missing_closing_tag_is_an_error() {
        let err = parse_plain("<div>hello").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingClosingTag {
                name: "div".to_string()
            }
        );
    }

    #[test]
    fn comments_are_discarded() {
        let template = parse_plain("<div><!-- note --><p>x</p></div>").unwrap();
        match &template.nodes()[0] {
            Node::Element { children, .. } => assert_eq!(children.len(), 1),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert_eq!(
            parse_plain("<!-- drifting").unwrap_err(),
            ParseError::UnterminatedComment
        );
    }

    #[test]
    fn attribute_quoting_forms() {
        let template =
            parse_plain(r#"<p a="one" b='two' c=three d></p>"#).unwrap();
        match &template.nodes()[0] {
            Node::Element { attributes, .. } => assert_eq!(
                attributes,
                &vec![
                    ("a".to_string(), "one".to_string()),
                    ("b".to_string(), "two".to_string()),
                    ("c".to_string(), "three".to_string()),
                    ("d".to_string(), String::new()),
                ]
            ),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn attribute_names_are_lowercased() {
        let template = parse_plain(r#"<p DATA-Key="v"></p>"#).unwrap();
        match &template.nodes()[0] {
            Node::Element { attributes, .. } => {
                assert_eq!(attributes[0].0, "data-key")
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn character_references_decode_in_text_and_attributes() {
        let template =
            parse_plain(r#"<p title="a &amp; b">&lt;&#65;&#x42;&gt;</p>"#).unwrap();
        match &template.nodes()[0] {
            Node::Element {
                attributes,
                children,
                ..
            } => {
                assert_eq!(attributes[0].1, "a & b");
                assert_eq!(children, &vec![Node::Text("<AB>".to_string())]);
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn unknown_named_reference_passes_through() {
        let template = parse_plain("<p>&zzzzz;</p>").unwrap();
        match &template.nodes()[0] {
            Node::Element { children, .. } => {
                assert_eq!(children, &vec![Node::Text("&zzzzz;".to_string())])
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn bare_ampersand_is_literal() {
        let template = parse_plain("<p>fish & chips &name</p>").unwrap();
        match &template.nodes()[0] {
            Node::Element { children, .. } => assert_eq!(
                children,
                &vec![Node::Text("fish & chips &name".to_string())]
            ),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn malformed_numeric_reference_fails_the_parse() {
        assert!(matches!(
            parse_plain("<p>&#x;</p>").unwrap_err(),
            ParseError::BadNumericReference { .. }
        ));
        assert!(matches!(
            parse_plain("<p>&#12z;</p>").unwrap_err(),
            ParseError::BadNumericReference { .. }
        ));
    }

    #[test]
    fn resolved_tag_becomes_an_actor_slot_with_merged_attributes() {
        let template =
            parse(&WidgetResolver, r#"<x-widget class="mine">hi</x-widget>"#).unwrap();
        match &template.nodes()[0] {
            Node::ActorSlot {
                actor,
                name,
                attributes,
                children,
                ..
            } => {
                assert_eq!(*actor, "widget-actor");
                assert_eq!(name, "x-widget");
                // Parsed attributes win on collision; defaults append after.
                assert_eq!(
                    attributes,
                    &vec![
                        ("class".to_string(), "mine".to_string()),
                        ("role".to_string(), "group".to_string()),
                    ]
                );
                assert_eq!(children, &vec![Node::Text("hi".to_string())]);
            }
            other => panic!("expected actor slot, got {:?}", other),
        }
    }

    #[test]
    fn slot_id_is_stable_across_parses_and_tracks_parsed_attributes() {
        let id_of = |input: &str| match &parse(&WidgetResolver, input).unwrap().nodes()[0] {
            Node::ActorSlot { id, .. } => id.clone(),
            other => panic!("expected actor slot, got {:?}", other),
        };
        let a1 = id_of(r#"<x-widget class="mine">hi</x-widget>"#);
        let a2 = id_of(r#"<x-widget class="mine">hi</x-widget>"#);
        let b = id_of(r#"<x-widget class="other">hi</x-widget>"#);
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }

    #[test]
    fn slot_id_ignores_component_defaults() {
        // Same call-site markup against resolvers with different defaults
        // hashes identically: id derives from the pre-merge element form.
        struct OtherDefaults;
        impl ComponentResolver for OtherDefaults {
            type ActorRef = &'static str;
            fn lookup(&self, tag: &str) -> Option<ComponentBinding<&'static str>> {
                WidgetResolver.lookup(tag).map(|mut b| {
                    b.default_attributes =
                        vec![("tone".to_string(), "dark".to_string())];
                    b
                })
            }
        }
        let id_a = match &parse(&WidgetResolver, "<x-widget>hi</x-widget>")
            .unwrap()
            .nodes()[0]
        {
            Node::ActorSlot { id, .. } => id.clone(),
            other => panic!("expected actor slot, got {:?}", other),
        };
        let id_b = match &parse(&OtherDefaults, "<x-widget>hi</x-widget>")
            .unwrap()
            .nodes()[0]
        {
            Node::ActorSlot { id, .. } => id.clone(),
            other => panic!("expected actor slot, got {:?}", other),
        };
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn round_trip_for_quote_free_markup() {
        let input = r#"<div class="card"><p>hi <b>there</b></p><img src="a.png"/></div>"#;
        let template = parse_plain(input).unwrap();
        let reparsed = parse_plain(&template.serialize()).unwrap();
        assert_eq!(template, reparsed);
    }

    #[test]
    fn expected_errors_report_line_and_column() {
        // '/' on line 2, column 5: non-void elements cannot self-close.
        let err = parse_plain("<p>\n<div/></p>").unwrap_err();
        assert_eq!(
            err,
            ParseError::Expected {
                expected: "'>' to close the <div> opening tag".to_string(),
                line: 2,
                column: 5,
            }
        );
    }

    #[test]
    fn stray_closing_tag_at_top_level_is_an_error() {
        assert!(parse_plain("</div>").is_err());
    }

    #[test]
    fn truncated_opening_tag_is_an_error() {
        assert!(matches!(
            parse_plain("<div class=").unwrap_err(),
            ParseError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            parse_plain(r#"<div class="x"#).unwrap_err(),
            ParseError::UnterminatedAttributeValue { quote: '"' }
        ));
    }
}

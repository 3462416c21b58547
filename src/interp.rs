use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| Regex::new(r"#\[([A-Za-z0-9_.\-]+)\]").unwrap())
}

/// Substitute every `#[token]` occurrence with the dictionary value for
/// `token`, or the bare token text when the key is absent. Text without
/// any placeholder passes through unchanged; missing keys never fail.
pub fn interpolate(dictionary: &HashMap<String, String>, text: &str) -> String {
    token_regex()
        .replace_all(text, |caps: &Captures| match dictionary.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[1].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dict(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn plain_text_is_untouched() {
        let d = dict(&[("user", "ada")]);
        assert_eq!(interpolate(&d, "no placeholders here"), "no placeholders here");
    }

    #[test]
    fn known_tokens_are_replaced() {
        let d = dict(&[("user", "ada"), ("app.title", "Console")]);
        assert_eq!(
            interpolate(&d, "Hi #[user], welcome to #[app.title]!"),
            "Hi ada, welcome to Console!"
        );
    }

    #[test]
    fn missing_tokens_fall_back_to_the_bare_key() {
        assert_eq!(interpolate(&HashMap::new(), "Hello #[user]"), "Hello user");
    }

    #[test]
    fn token_charset_is_word_dot_dash() {
        let d = dict(&[("a_b-c.d", "yes")]);
        assert_eq!(interpolate(&d, "#[a_b-c.d]"), "yes");
        // '[' inside the brackets is not a token; left alone
        assert_eq!(interpolate(&d, "#[not a token]"), "#[not a token]");
        assert_eq!(interpolate(&d, "#[]"), "#[]");
    }
}

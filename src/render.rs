//! The token-substitution engine. Templates are ordinary HTML files
//! containing fixed anchor strings; rendering replaces each anchor with a
//! caller-supplied payload. Payloads are opaque data: nothing in the
//! mechanism treats payload bytes (`/`, `&`, quotes, ...) as syntax, which
//! matters because labels and destination URLs are editor-supplied free
//! text.

/// Applies `substitutions` to `template` in order and returns the rendered
/// text. Each `(pattern, replacement)` rule is a literal find/replace: every
/// occurrence of `pattern` present when the rule runs is replaced exactly
/// once, and a rule is never reapplied to its own output. Rendering is pure;
/// the same inputs always produce the same text.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut rendered = template.to_owned();
    for (pattern, replacement) in substitutions {
        rendered = rendered.replace(pattern, replacement);
    }
    rendered
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replaces_every_occurrence() {
        assert_eq!(
            "a b / a b",
            render("X Y / X Y", &[("X", "a"), ("Y", "b")]),
        );
    }

    #[test]
    fn test_order_matters() {
        // The second rule targets text that only exists after the first rule
        // has run.
        assert_eq!("c", render("a", &[("a", "b"), ("b", "c")]));
        assert_eq!("b", render("a", &[("b", "c"), ("a", "b")]));
    }

    #[test]
    fn test_rule_not_reapplied_to_own_output() {
        assert_eq!("aa", render("a", &[("a", "aa")]));
    }

    #[test]
    fn test_payload_characters_are_opaque() {
        assert_eq!(
            r#"<a href="redirect/Acme.html">"#,
            render(
                r#"<a href="sponsor/outbound.html">"#,
                &[("sponsor/outbound.html", "redirect/Acme.html")],
            ),
        );
        assert_eq!(
            "meta https://acme.example/?q=a&b=c\\d",
            render("meta TARGET", &[("TARGET", "https://acme.example/?q=a&b=c\\d")]),
        );
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let subs = [("NAME", "Acme"), ("URL", "https://acme.example/")];
        let first = render("NAME -> URL", &subs);
        let second = render("NAME -> URL", &subs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_pattern_is_a_noop() {
        assert_eq!("untouched", render("untouched", &[("ABSENT", "x")]));
    }
}

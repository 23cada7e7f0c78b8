//! Single-character template substitution
//!
//! User-facing format strings use `%x` placeholders (`%t` for the title,
//! `%a` for the artist, ...). The recognized characters and their
//! replacement values vary per call site, so both are passed in.

/// Replace `%x` placeholders in `template`.
///
/// `%` enters token mode for exactly the next character. A character found
/// in `token_chars` is replaced by the value at the same position in
/// `values`; any other character is copied through as the literal two
/// characters `%x`. A trailing bare `%` is dropped.
pub fn custom_format(template: &str, token_chars: &str, values: &[&str]) -> String {
    debug_assert_eq!(token_chars.chars().count(), values.len());

    let mut out = String::with_capacity(template.len());
    let mut in_token = false;
    for c in template.chars() {
        if !in_token {
            if c == '%' {
                in_token = true;
            } else {
                out.push(c);
            }
        } else {
            match token_chars.chars().position(|t| t == c) {
                Some(index) => out.push_str(values[index]),
                None => {
                    // unknown placeholder, keep it verbatim
                    out.push('%');
                    out.push(c);
                }
            }
            in_token = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_known_tokens() {
        let out = custom_format("\"%t\" by \"%a\"", "ta", &["So What", "Miles Davis"]);
        assert_eq!(out, "\"So What\" by \"Miles Davis\"");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(custom_format("no tokens here", "ta", &["x", "y"]), "no tokens here");
    }

    #[test]
    fn applying_twice_to_token_free_output_is_a_noop() {
        let once = custom_format("%a - %t", "at", &["Air", "La Femme d'Argent"]);
        let twice = custom_format(&once, "at", &["other", "values"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_tokens_stay_verbatim() {
        assert_eq!(custom_format("%t %z!", "t", &["title"]), "title %z!");
    }

    #[test]
    fn empty_replacement_values() {
        assert_eq!(custom_format("[%r]%t", "rt", &["", "title"]), "[]title");
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        assert_eq!(custom_format("%t/%t/%t", "t", &["x"]), "x/x/x");
    }

    #[test]
    fn trailing_percent_is_dropped() {
        assert_eq!(custom_format("abc%", "t", &["x"]), "abc");
    }
}

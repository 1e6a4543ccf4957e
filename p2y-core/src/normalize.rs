//! Payee-name normalization: strip known bank description prefixes
//! ("Compra no débito|...", "Transferência enviada|...") and title-case
//! the remainder.

/// Strip the first matching prefix (anchored at the start of the string,
/// first match wins), trim the remainder, and title-case the result.
/// With no matching prefix the description passes through untrimmed,
/// title-cased only.
pub fn normalize_payee<S: AsRef<str>>(description: &str, prefixes: &[S]) -> String {
    for prefix in prefixes {
        if let Some(rest) = description.strip_prefix(prefix.as_ref()) {
            return title_case(rest.trim());
        }
    }
    title_case(description)
}

/// Uppercase the first letter of each whitespace-separated word, lowercase
/// the rest. Whitespace is preserved as-is.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

//! `$%`-delimited placeholder substitution.
//!
//! LS-DYNA uses `$` as its comment character, so placeholders are introduced
//! by `$%` instead:
//!
//! - `$%key` / `$%{key}` is replaced by the record value for `key`
//! - `$%$%` produces a literal `$%`
//! - any other `$` is copied through unchanged
//!
//! Keys are ASCII identifiers (`[A-Za-z_][A-Za-z0-9_]*`).

use std::collections::BTreeMap;

const DELIMITER: &str = "$%";

/// Substitute every placeholder in `template`; the error names the offending key.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(DELIMITER) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + DELIMITER.len()..];

        if let Some(tail) = after.strip_prefix(DELIMITER) {
            out.push_str(DELIMITER);
            rest = tail;
            continue;
        }

        let (key, tail) = if let Some(braced) = after.strip_prefix('{') {
            let close = braced
                .find('}')
                .ok_or_else(|| format!("unterminated placeholder '$%{{{}'", preview(braced)))?;
            let key = &braced[..close];
            if identifier_len(key) != key.len() || key.is_empty() {
                return Err(format!("malformed placeholder '$%{{{key}}}'"));
            }
            (key, &braced[close + 1..])
        } else {
            let len = identifier_len(after);
            if len == 0 {
                return Err(format!("malformed placeholder '$%{}'", preview(after)));
            }
            (&after[..len], &after[len..])
        };

        let value = values
            .get(key)
            .ok_or_else(|| format!("unknown placeholder key '{key}'"))?;
        out.push_str(value);
        rest = tail;
    }

    out.push_str(rest);
    Ok(out)
}

/// Length in bytes of the identifier at the start of `s` (0 if none).
fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn preview(s: &str) -> String {
    s.chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BTreeMap<String, String> {
        [("Title", "steel"), ("E", " 210000.0"), ("a0", "0.0")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn plain_and_braced_keys() {
        let out = substitute("$%Title|$%{E}x|$%a0", &record()).unwrap();
        assert_eq!(out, "steel| 210000.0x|0.0");
    }

    #[test]
    fn lone_dollar_and_escape_pass_through() {
        let text = "$ comment line\n$#   mid\n$%$%Title\n";
        assert_eq!(substitute(text, &record()).unwrap(), "$ comment line\n$#   mid\n$%Title\n");
    }

    #[test]
    fn identifier_stops_at_punctuation() {
        assert_eq!(substitute("$%a0,$%a0.", &record()).unwrap(), "0.0,0.0.");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = substitute("$%o7", &record()).unwrap_err();
        assert!(err.contains("o7"), "{err}");
    }

    #[test]
    fn malformed_placeholders_are_errors() {
        assert!(substitute("$% title", &record()).is_err());
        assert!(substitute("$%{Title", &record()).is_err());
        assert!(substitute("$%{1a}", &record()).is_err());
        assert!(substitute("end $%", &record()).is_err());
    }
}

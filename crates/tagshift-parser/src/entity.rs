//! Character references in attribute values.
//!
//! The markup generator writes `&` as `&amp;` and the surrounding quote as
//! `&quot;` / `&#39;`; the markup parser decodes those (plus `&apos;`, `&lt;`,
//! `&gt;` and `&#34;`). Any value therefore survives a render / parse cycle.
//! Unknown references are kept verbatim. Text content is not touched.

const REFERENCES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&quot;", '"'),
    ("&#34;", '"'),
    ("&apos;", '\''),
    ("&#39;", '\''),
    ("&lt;", '<'),
    ("&gt;", '>'),
];

/// Decode the known character references in an attribute value.
pub fn decode(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match REFERENCES.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, c)) => {
                out.push(*c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Encode an attribute value for output inside `quote` (`"` or `'`).
pub fn encode(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_known_references() {
        assert_eq!(decode("a&quot;b&#39;c &amp; &lt;x&gt;"), "a\"b'c & <x>");
    }

    #[test]
    fn test_decode_keeps_unknown_references() {
        assert_eq!(decode("&nbsp;&"), "&nbsp;&");
        assert_eq!(decode("plain"), "plain");
    }

    #[test]
    fn test_encode_only_the_active_quote() {
        assert_eq!(encode("a\"b'c", '"'), "a&quot;b'c");
        assert_eq!(encode("a\"b'c", '\''), "a\"b&#39;c");
    }

    #[test]
    fn test_encoded_ampersand_survives_decode() {
        for value in ["&quot;", "R&D", "&amp;amp;", "x\"y'z&"] {
            assert_eq!(decode(&encode(value, '"')), value);
        }
    }
}

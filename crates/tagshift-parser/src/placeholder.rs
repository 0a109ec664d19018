//! `$` numbering and backslash escapes for shorthand strings.
//!
//! Shorthand values travel through the parser in raw form: `\X` pairs and `$`
//! runs are untouched until [`number`] substitutes a generation index and
//! [`unescape`] produces the final text.

/// Replace every run of `$` with `index`, zero-padded to the run length.
/// Escaped characters (`\$`) are skipped and stay escaped.
///
/// `$` → `3`, `$$` → `03`, `$$$` → `003`.
pub fn number(raw: &str, index: usize) -> String {
    if !raw.contains('$') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '$' => {
                let mut width = 1;
                while chars.peek() == Some(&'$') {
                    chars.next();
                    width += 1;
                }
                out.push_str(&format!("{index:0width$}"));
            }
            _ => out.push(c),
        }
    }

    out
}

/// Resolve `\X` escapes to `X`. A trailing lone backslash is kept.
pub fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Backslash-escape `\` and every character in `specials`. Inverse of [`unescape`].
pub fn escape(text: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_single() {
        assert_eq!(number("Item $", 3), "Item 3");
    }

    #[test]
    fn test_number_padded() {
        assert_eq!(number("Item $$", 2), "Item 02");
        assert_eq!(number("$$$", 7), "007");
    }

    #[test]
    fn test_number_wider_than_padding() {
        assert_eq!(number("$", 12), "12");
        assert_eq!(number("$$", 123), "123");
    }

    #[test]
    fn test_number_multiple_runs() {
        assert_eq!(number("R$C$$", 4), "R4C04");
    }

    #[test]
    fn test_number_skips_escape() {
        assert_eq!(number("Price: \\$5 #$", 2), "Price: \\$5 #2");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("Price: \\$5"), "Price: $5");
        assert_eq!(unescape("a\\\\b"), "a\\b");
        assert_eq!(unescape("\\}"), "}");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "cost {$5} \\ done";
        let escaped = escape(original, &['$', '{', '}']);
        assert_eq!(escaped, "cost \\{\\$5\\} \\\\ done");
        assert_eq!(unescape(&escaped), original);
    }
}

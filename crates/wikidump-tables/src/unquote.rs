//! Decoding of single-quoted SQL string literals

/// Decode the body of a dumped string literal.
///
/// `''` is the empty string and `\'` an embedded quote; every other
/// character, including other backslash escapes, passes through unchanged.
pub fn unquote(input: &str) -> String {
    if input == "''" {
        return String::new();
    }
    input.replace("\\'", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inverse of [`unquote`] for text whose quotes are all escaped
    fn requote(decoded: &str) -> String {
        decoded.replace('\'', "\\'")
    }

    #[test]
    fn empty_literal() {
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn escaped_quote() {
        assert_eq!(unquote("O\\'Brien"), "O'Brien");
        assert_eq!(unquote("\\'\\'"), "''");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("Île-de-France"), "Île-de-France");
    }

    #[test]
    fn other_escapes_pass_through() {
        assert_eq!(unquote("a\\\"b"), "a\\\"b");
        assert_eq!(unquote("C:\\\\dir"), "C:\\\\dir");
    }

    #[test]
    fn decode_then_reencode_recovers_input() {
        for raw in [
            "plain",
            "O\\'Brien",
            "\\'quoted\\'",
            "Rock_\\'n\\'_roll",
            "日本語\\'s",
            "",
        ] {
            assert_eq!(requote(&unquote(raw)), raw, "input: {raw}");
        }
    }

    #[test]
    fn deterministic() {
        let raw = "L\\'Oréal";
        assert_eq!(unquote(raw), unquote(raw));
    }
}

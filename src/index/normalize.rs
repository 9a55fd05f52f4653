//! Title normalization
//!
//! Titles are compared in canonical form: surrounding whitespace removed,
//! inner whitespace runs collapsed to one space, everything lowercased.
//! The same function runs at index-build time and at query time.

/// Returns the canonical comparison form of `s`.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_collapses_and_lowercases() {
        assert_eq!(normalize("  The   Great Gatsby  "), "the great gatsby");
    }

    #[test]
    fn test_tabs_and_newlines_are_whitespace() {
        assert_eq!(normalize("\tDragon\n\nBall  Z\r\n"), "dragon ball z");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_idempotent() {
        for s in ["  One   PIECE ", "Naruto", " a  b\tc ", "", "ÉCOLE  Élite"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_non_ascii_lowercased() {
        assert_eq!(normalize("ÉCOLE"), "école");
    }
}

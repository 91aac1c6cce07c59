/// Keyword of the generated-code target that cannot be used as a member name.
const RESERVED_IDENTIFIER: &str = "void";

/// Map a free-text illustration title to a stable, code-safe identifier.
///
/// The title is trimmed and lower-cased, spaces and hyphens become `_`, a
/// leading digit run gets an `_` prefix, and the reserved word `void` is
/// renamed to `void_`. Distinct titles may collapse to the same identifier.
pub fn derive_identifier(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let mut value = lowered.replace([' ', '-'], "_");

    if value.starts_with(|ch: char| ch.is_ascii_digit()) {
        value.insert(0, '_');
    }
    if value == RESERVED_IDENTIFIER {
        value.push('_');
    }
    value
}

#[cfg(test)]
mod tests {
    use super::derive_identifier;

    #[test]
    fn derives_documented_examples() {
        assert_eq!(derive_identifier("3D Printing"), "_3d_printing");
        assert_eq!(derive_identifier("Void"), "void_");
        assert_eq!(derive_identifier("  Team Work  "), "team_work");
    }

    #[test]
    fn hyphens_and_spaces_become_underscores() {
        assert_eq!(derive_identifier("Hello-World Again"), "hello_world_again");
        assert_eq!(derive_identifier("a - b"), "a___b");
    }

    #[test]
    fn only_the_leading_digit_run_is_prefixed() {
        assert_eq!(derive_identifier("404 Error"), "_404_error");
        assert_eq!(derive_identifier("Page 404"), "page_404");
    }

    #[test]
    fn void_is_renamed_only_as_a_whole_identifier() {
        assert_eq!(derive_identifier(" VOID "), "void_");
        assert_eq!(derive_identifier("Into the void"), "into_the_void");
        assert_eq!(derive_identifier("Voids"), "voids");
    }

    #[test]
    fn derived_identifiers_never_contain_separators_or_start_with_digits() {
        let titles = [
            "1st Place",
            "  - dashed -  ",
            "Mixed Case-Title 42",
            "",
            "9",
            "void",
            "über cool",
        ];
        for title in titles {
            let id = derive_identifier(title);
            assert!(!id.contains(' '), "space in {id:?}");
            assert!(!id.contains('-'), "hyphen in {id:?}");
            assert!(
                !id.starts_with(|ch: char| ch.is_ascii_digit()),
                "leading digit in {id:?}"
            );
            assert_eq!(id, derive_identifier(title));
        }
    }
}

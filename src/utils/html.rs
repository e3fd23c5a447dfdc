/// Strips unsafe markup from admin-supplied catalogue text (prompts,
/// options, explanations) while keeping harmless formatting tags.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Same as [`clean_html`] for optional fields.
pub fn clean_optional(input: Option<String>) -> Option<String> {
    input.map(|text| clean_html(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_removed() {
        assert_eq!(clean_html("Who won?<script>alert(1)</script>"), "Who won?");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(
            clean_optional(Some("Boston Celtics".to_string())),
            Some("Boston Celtics".to_string())
        );
    }
}

/// The system prompt used for extracting recipes from page text.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECIPE_EXTRACTION_PROMPT: &str = include_str!("prompt.txt");

/// Build the user message: the page address followed by its (already truncated) text.
pub fn build_user_message(url: &str, title: Option<&str>, page_text: &str) -> String {
    let mut message = format!("Page URL: {url}\n");
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        message.push_str(&format!("Page title: {title}\n"));
    }
    message.push_str("\nPage content:\n");
    message.push_str(page_text);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECIPE_EXTRACTION_PROMPT.is_empty());
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"ingredients\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"instructions\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"error\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"totalTime\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"recipeYield\""));
        assert!(RECIPE_EXTRACTION_PROMPT.contains("\"nutrition\""));
    }

    #[test]
    fn test_build_user_message() {
        let message = build_user_message("https://example.com/r/1", Some(" Soup "), "Boil water");
        assert!(message.starts_with("Page URL: https://example.com/r/1\n"));
        assert!(message.contains("Page title: Soup\n"));
        assert!(message.ends_with("Page content:\nBoil water"));

        let untitled = build_user_message("https://example.com/r/1", Some("  "), "text");
        assert!(!untitled.contains("Page title"));
    }
}

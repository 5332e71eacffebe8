use std::collections::BTreeSet;

use crate::model::{MissingField, RecipeCandidate, ValidationResult};

/// Check a candidate against the configured completeness rules.
///
/// A list counts as present when at least one entry is not blank.
pub fn validate(
    candidate: &RecipeCandidate,
    require_ingredients: bool,
    require_instructions: bool,
) -> ValidationResult {
    let mut missing = BTreeSet::new();

    if require_ingredients && !has_content(&candidate.ingredients) {
        missing.insert(MissingField::Ingredients);
    }
    if require_instructions && !has_content(&candidate.instructions) {
        missing.insert(MissingField::Instructions);
    }

    ValidationResult {
        is_complete: missing.is_empty(),
        missing,
    }
}

fn has_content(entries: &[String]) -> bool {
    entries.iter().any(|entry| !entry.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(ingredients: &[&str], instructions: &[&str]) -> RecipeCandidate {
        RecipeCandidate {
            source_url: "https://example.com/recipe".to_string(),
            title: "Test Recipe".to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_recipe() {
        let result = validate(&candidate(&["1 egg"], &["Boil the egg"]), true, true);
        assert!(result.is_complete);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_missing_ingredients() {
        let result = validate(&candidate(&[], &["Step 1"]), true, true);
        assert!(!result.is_complete);
        assert!(result.missing.contains(&MissingField::Ingredients));
        assert!(!result.missing.contains(&MissingField::Instructions));
    }

    #[test]
    fn test_missing_instructions() {
        let result = validate(&candidate(&["flour"], &[]), true, true);
        assert!(!result.is_complete);
        assert_eq!(
            result.missing.iter().copied().collect::<Vec<_>>(),
            vec![MissingField::Instructions]
        );
    }

    #[test]
    fn test_missing_both() {
        let result = validate(&candidate(&[], &[]), true, true);
        assert_eq!(result.missing.len(), 2);
        assert_eq!(result.describe_missing(), "ingredients and instructions");
    }

    #[test]
    fn test_blank_entries_do_not_count() {
        let result = validate(&candidate(&["  ", ""], &["Stir"]), true, true);
        assert!(!result.is_complete);
        assert!(result.missing.contains(&MissingField::Ingredients));
    }

    #[test]
    fn test_requirements_can_be_disabled() {
        let empty = candidate(&[], &[]);
        assert!(validate(&empty, false, false).is_complete);
        assert!(validate(&empty, false, true)
            .missing
            .contains(&MissingField::Instructions));
        assert!(validate(&empty, true, false)
            .missing
            .contains(&MissingField::Ingredients));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let input = candidate(&["salt"], &[]);
        let first = validate(&input, true, true);
        let second = validate(&input, true, true);
        assert_eq!(first, second);
        assert_eq!(input, candidate(&["salt"], &[]));
    }

    #[test]
    fn test_empty_ingredients_always_reported_when_required() {
        for instructions in [&[][..], &["one"][..], &["one", "two", "three"][..]] {
            for require_instructions in [true, false] {
                let result = validate(&candidate(&[], instructions), true, require_instructions);
                assert!(!result.is_complete);
                assert!(result.missing.contains(&MissingField::Ingredients));
            }
        }
    }
}

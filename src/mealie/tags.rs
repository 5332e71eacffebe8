/// Build a tag slug the way Mealie expects it: lower-case ASCII words joined by dashes.
///
/// Polish diacritics are folded to their base letters; every other
/// non-alphanumeric character becomes a separator.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.to_lowercase().chars() {
        let c = match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            other => other,
        };

        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(generate_slug("Discord Import"), "discord-import");
        assert_eq!(generate_slug("Verify"), "verify");
    }

    #[test]
    fn test_polish_characters_are_folded() {
        assert_eq!(generate_slug("Żółć gęślą"), "zolc-gesla");
        assert_eq!(generate_slug("Łatwe Śniadanie"), "latwe-sniadanie");
    }

    #[test]
    fn test_separators_collapse_and_trim() {
        assert_eq!(generate_slug("  --Quick &  Easy!! "), "quick-easy");
        assert_eq!(generate_slug("30 min"), "30-min");
        assert_eq!(generate_slug("!!!"), "");
    }
}

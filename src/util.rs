//! Shared utility functions
//!
//! Naming helpers used by the renderers and template filters.

/// Convert snake_case or PascalCase to PascalCase
///
/// # Examples
/// ```
/// use cloneplan::util::to_pascal_case;
/// assert_eq!(to_pascal_case("clone_safe"), "CloneSafe");
/// assert_eq!(to_pascal_case("CloneSafe"), "CloneSafe");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert snake_case or PascalCase to camelCase
///
/// # Examples
/// ```
/// use cloneplan::util::to_camel_case;
/// assert_eq!(to_camel_case("CloneSafe"), "cloneSafe");
/// assert_eq!(to_camel_case("deep_copy"), "deepCopy");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prefix every line with a line-comment marker
pub fn line_comment(text: &str, marker: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                marker.to_string()
            } else {
                format!("{} {}", marker, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

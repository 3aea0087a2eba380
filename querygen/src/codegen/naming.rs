//! Naming utilities for query templates

use heck::{ToLowerCamelCase, ToPascalCase};

/// Convert a `_`-delimited identifier to lowerCamelCase
/// e.g., "product_spu" -> "productSpu"
pub fn to_camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Convert a `_`-delimited identifier to PascalCase
/// e.g., "product_spu" -> "ProductSpu"
pub fn to_pascal_case(name: &str) -> String {
    name.to_pascal_case()
}

/// Pluralize the last `_`-delimited word of an identifier
/// e.g., "product_category" -> "product_categories"
pub fn pluralize(name: &str) -> String {
    match name.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize_word(last)),
        None => pluralize_word(name),
    }
}

/// Pluralize a word using English grammar rules
fn pluralize_word(word: &str) -> String {
    if word.is_empty() {
        return word.to_string();
    }

    // Irregular plurals (common in database contexts)
    let irregulars: &[(&str, &str)] = &[
        ("person", "people"),
        ("child", "children"),
        ("index", "indices"),
        ("info", "info"),
        ("data", "data"),
    ];

    for (singular, plural) in irregulars {
        if word == *singular {
            return plural.to_string();
        }
    }

    // Words ending in -is → -es (analysis → analyses)
    if word.ends_with("is") && word.len() > 2 {
        return format!("{}es", &word[..word.len() - 2]);
    }

    // Standard rules: -s, -x, -z, -ch, -sh → add -es
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }

    // Words ending in consonant + y → -ies
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}

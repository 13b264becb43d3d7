//! Identifier casing helpers shared by the language mappings and templates.

/// Upper-cases the first character.
///
/// ```
/// use codecgen::naming::capital;
///
/// assert_eq!(capital("map"), "Map");
/// assert_eq!(capital("addEntryListener"), "AddEntryListener");
/// assert_eq!(capital(""), "");
/// ```
pub fn capital(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character.
pub fn uncapital(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns a canonical name into PascalCase: parentheses are dropped and each
/// `_`-separated part is capitalised.
///
/// ```
/// use codecgen::naming::pascal_case;
///
/// assert_eq!(pascal_case("List_String"), "ListString");
/// assert_eq!(pascal_case("entry_(key)_view"), "EntryKeyView");
/// ```
pub fn pascal_case(name: &str) -> String {
    name.replace(['(', ')'], "")
        .split('_')
        .map(capital)
        .collect()
}

/// Converts camelCase or PascalCase into UPPER_SNAKE_CASE.
///
/// An underscore goes before an upper-case letter that follows a lower-case
/// letter or digit, and before an upper-case letter that starts a new word
/// after an acronym.
///
/// ```
/// use codecgen::naming::to_upper_snake_case;
///
/// assert_eq!(to_upper_snake_case("addEntryListener"), "ADD_ENTRY_LISTENER");
/// assert_eq!(to_upper_snake_case("HTTPServer"), "HTTP_SERVER");
/// assert_eq!(to_upper_snake_case("put"), "PUT");
/// ```
pub fn to_upper_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }

    out
}

/// Converts camelCase or PascalCase into lower snake_case.
pub fn to_snake_case(name: &str) -> String {
    to_upper_snake_case(name).to_lowercase()
}

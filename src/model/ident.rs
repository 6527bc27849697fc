//! Escaping of JSON property names into accessor identifiers and type names.

use std::sync::LazyLock;

use regex::Regex;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\p{Lu}+)(\p{Lu}\p{Ll})").expect("static pattern"));
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\p{Ll}\p{N}])(\p{Lu})").expect("static pattern"));
static NON_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static pattern"));

const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "yield",
];

/// Turns a property name into a snake_case accessor.
///
/// `averageValue` becomes `average_value`, `HFLAVTau` becomes `hflav_tau`,
/// `References` becomes `references`. Letters and digits outside ASCII are
/// kept (`Δm` becomes `δm`). Reserved words get a trailing underscore
/// (`type_`), and a leading digit gets a leading one (`_2023`).
pub(crate) fn accessor(name: &str) -> String {
    let split = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let split = CAMEL_BOUNDARY.replace_all(&split, "${1}_${2}");
    let joined = NON_IDENT.replace_all(&split, "_");
    let mut ident = joined
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();

    if ident.is_empty() {
        ident.push_str("field");
    }
    if ident.starts_with(char::is_numeric) {
        ident.insert(0, '_');
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Turns a property name into a PascalCase type-name fragment.
pub(crate) fn type_fragment(name: &str) -> String {
    NON_IDENT
        .split(name)
        .flat_map(|part| part.split('_'))
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

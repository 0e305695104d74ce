//! Identifier helpers for generated Rust code.

/// Convert a snake_case (or kebab/space separated) name to CamelCase.
///
/// ```rust
/// use httpbind::codegen::to_camel_case;
///
/// assert_eq!(to_camel_case("not_found"), "NotFound");
/// assert_eq!(to_camel_case("list-items"), "ListItems");
/// ```
#[must_use]
pub fn to_camel_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == ' ' || c == '.')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert CamelCase or mixed names to snake_case.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    out
}

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Field or function name: invalid characters become `_`, leading digits
/// get a `_` prefix and keywords are raw.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let mut s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    match s.as_str() {
        // cannot be raw identifiers
        "self" | "Self" | "super" | "crate" => format!("{s}_"),
        k if KEYWORDS.contains(&k) => format!("r#{s}"),
        _ => s,
    }
}

/// Type name for a model name.
#[must_use]
pub fn type_ident(name: &str) -> String {
    let camel = to_camel_case(&sanitize_identifier(name).replace("r#", ""));
    if KEYWORDS.contains(&camel.as_str()) {
        format!("{camel}_")
    } else {
        camel
    }
}

/// Function and module name for a model name.
#[must_use]
pub fn fn_ident(name: &str) -> String {
    sanitize_identifier(&to_snake_case(name))
}

/// `{method}_{service}_path`, suffixed with `N` (2, 3, ...) for alternative
/// routes.
#[must_use]
pub fn path_fn_name(service: &str, method: &str, route_index: usize) -> String {
    let base = format!("{}_{}_path", to_snake_case(method), to_snake_case(service));
    if route_index == 0 {
        base
    } else {
        format!("{base}{}", route_index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("ListItems"), "list_items");
        assert_eq!(to_snake_case("list items"), "list_items");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("getHTTP2"), "get_http2");
    }

    #[test]
    fn identifiers_are_sanitized() {
        assert_eq!(sanitize_identifier("type"), "r#type");
        assert_eq!(sanitize_identifier("self"), "self_");
        assert_eq!(sanitize_identifier("2fa"), "_2fa");
        assert_eq!(sanitize_identifier("x-trace"), "x_trace");
        assert_eq!(type_ident("self"), "Self_");
    }

    #[test]
    fn path_function_names() {
        assert_eq!(path_fn_name("items", "show", 0), "show_items_path");
        assert_eq!(path_fn_name("items", "show", 1), "show_items_path2");
        assert_eq!(path_fn_name("items", "show", 2), "show_items_path3");
    }
}

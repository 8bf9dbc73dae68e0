//! Identifier conversion between GIR naming conventions and the generated
//! TypeScript surface.
//!
//! GIR uses snake_case for methods/parameters and kebab-case for signal and
//! property names; the generated API is camelCase with PascalCase type names
//! and kebab-case module file names.

/// JavaScript/TypeScript reserved words that cannot be used as parameter or
/// member names. Escaped by suffixing an underscore (`class` → `class_`).
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Returns `true` if `name` is a JavaScript reserved word.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Escape a reserved word by appending a trailing underscore.
/// Non-reserved names pass through unchanged.
pub fn escape_reserved(name: &str) -> String {
    if is_reserved_word(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Convert a snake_case or kebab-case identifier to camelCase.
///
/// The first segment is lowercased, subsequent segments are capitalized and
/// separator characters are removed. Empty segments (from doubled separators)
/// are skipped.
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut first_segment = true;
    for segment in s.split(['_', '-']) {
        if segment.is_empty() {
            continue;
        }
        if first_segment {
            out.push_str(&segment.to_lowercase());
            first_segment = false;
        } else {
            let mut chars = segment.chars();
            if let Some(c) = chars.next() {
                out.extend(c.to_uppercase());
                out.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    out
}

/// Convert a snake_case or kebab-case identifier to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    let camel = to_camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => camel,
    }
}

/// Convert a PascalCase type name to the kebab-case module file stem used
/// for generated files (`FileChooserDialog` → `file-chooser-dialog`).
///
/// Runs of capitals stay together (`RGBA` → `rgba`, `GdkRGBA` → `gdk-rgba`).
pub fn to_kebab_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' || c == '-' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a GIR parameter name to its generated JavaScript name:
/// camelCase plus reserved-word escaping.
pub fn to_js_param_name(s: &str) -> String {
    escape_reserved(&to_camel_case(s))
}

/// Module path for a generated class/record file: `Foo` → `./foo.js`,
/// `FileChooserDialog` → `./file-chooser-dialog.js`.
pub fn module_path(type_name: &str) -> String {
    format!("./{}.js", to_kebab_case(type_name))
}

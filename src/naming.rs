//! Casing transforms for generated identifiers and output file names.
use std::fmt;

/// File-name convention for generated outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NamingStyle {
    Kebab,
    Snake,
    Camel,
}

impl NamingStyle {
    pub fn apply(self, raw: &str) -> String {
        let converted = match self {
            NamingStyle::Kebab => kebab(raw),
            NamingStyle::Snake => snake(raw),
            NamingStyle::Camel => camel(raw),
        };
        if converted.is_empty() { raw.to_string() } else { converted }
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NamingStyle::Kebab => "kebab",
            NamingStyle::Snake => "snake",
            NamingStyle::Camel => "camel",
        })
    }
}

/// Split on separators and on case boundaries: `"HTTPServer_v2Api"` gives
/// `["HTTP", "Server", "v2", "Api"]`.
pub fn words(raw: &str) -> Vec<String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                out.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn pascal(raw: &str) -> String {
    words(raw).iter().map(|w| capitalize(w)).collect()
}

pub fn camel(raw: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(raw).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

pub fn snake(raw: &str) -> String {
    lower_joined(raw, "_")
}

pub fn kebab(raw: &str) -> String {
    lower_joined(raw, "-")
}

fn lower_joined(raw: &str, sep: &str) -> String {
    words(raw).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join(sep)
}

/// Uppercase the first character only.
pub fn upper_first(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Exported Go name: kept when already an uppercase identifier, PascalCased
/// otherwise.
pub fn exported(raw: &str) -> String {
    if is_identifier(raw) && raw.starts_with(|c: char| c.is_uppercase()) {
        return raw.to_string();
    }
    let converted = pascal(raw);
    if converted.starts_with(|c: char| c.is_alphabetic()) {
        converted
    } else {
        format!("X{converted}")
    }
}

/// Plain identifier: kept when already valid, camelCased otherwise.
pub fn identifier(raw: &str) -> String {
    if is_identifier(raw) {
        return raw.to_string();
    }
    let converted = camel(raw);
    if converted.starts_with(|c: char| c.is_alphabetic()) {
        converted
    } else {
        format!("_{converted}")
    }
}

use crate::config::KeyFormat;

const DART_KEYWORDS: [&str; 33] = [
    "assert", "break", "case", "catch", "class", "const", "continue",
    "default", "do", "else", "enum", "extends", "false", "final",
    "finally", "for", "if", "in", "is", "new", "null", "rethrow",
    "return", "super", "switch", "this", "throw", "true", "try",
    "var", "void", "while", "with",
];

/// Net number of occurrences of `needle`, used for brace and paren depth tracking.
pub fn count(source: &str, needle: char) -> i32 {
    source.chars().filter(|&c| c == needle).count() as i32
}

pub fn remove_start<'a>(source: &'a str, start: &str) -> &'a str {
    source.strip_prefix(start).unwrap_or(source)
}

pub fn remove_end<'a>(source: &'a str, end: &str) -> &'a str {
    source.strip_suffix(end).unwrap_or(source)
}

/// Trims, then strips each prefix in turn (trimming again after every step).
pub fn remove_start_any<'a>(source: &'a str, starts: &[&str]) -> &'a str {
    starts
        .iter()
        .fold(source.trim(), |acc, start| remove_start(acc, start).trim())
}

/// Trims, then strips each suffix in turn (trimming again after every step).
pub fn remove_end_any<'a>(source: &'a str, ends: &[&str]) -> &'a str {
    ends.iter()
        .fold(source.trim(), |acc, end| remove_end(acc, end).trim())
}

/// Equality that ignores every whitespace character, wherever it appears.
pub fn are_strict_equal(a: &str, b: &str) -> bool {
    a.chars()
        .filter(|c| !c.is_whitespace())
        .eq(b.chars().filter(|c| !c.is_whitespace()))
}

/// True if any space separated word of `source` equals one of `words`.
pub fn includes_word(source: &str, words: &[&str]) -> bool {
    source.split(' ').any(|w| words.contains(&w))
}

pub fn includes_one(source: &str, matches: &[&str]) -> bool {
    matches.iter().any(|m| source.contains(m))
}

pub fn includes_all(source: &str, matches: &[&str]) -> bool {
    matches.iter().all(|m| source.contains(m))
}

pub fn is_blank(source: &str) -> bool {
    source.trim().is_empty()
}

/// Prefixes every non-empty line with two spaces. The result always ends
/// with a newline.
pub fn indent(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    for line in source.split('\n') {
        if !line.is_empty() {
            out.push_str("  ");
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn capitalize(source: &str) -> String {
    let mut chars = source.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Turns an arbitrary key into a valid Dart identifier.
///
/// Separators (`-`, `~`, `:`, `#`, `$`) are dropped and the following word
/// capitalized, keywords get a trailing underscore and a leading digit is
/// prefixed with `n`.
pub fn to_var_name(source: &str) -> String {
    let mut name = String::with_capacity(source.len());
    for (i, word) in source
        .split(|c| matches!(c, '-' | '~' | ':' | '#' | '$'))
        .enumerate()
    {
        if i == 0 {
            name.push_str(word);
        } else {
            name.push_str(&capitalize(word));
        }
    }

    if DART_KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'n');
    }

    name
}

/// `snake_case`/`kebab-case` to `camelCase`.
pub fn camel_case(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, '-' | '_') {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Converts a string to snake_case.
/// Consecutive uppercase letters stay together, so acronyms remain intact
/// (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::with_capacity(s.len() + 4);
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if prev != '_'
                    && (!prev.is_uppercase()
                        || (i + 1 < chars.len() && chars[i + 1].is_lowercase()))
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            snake.push('_');
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Serialization key of a member named `name` under the configured format.
pub fn var_to_key(name: &str, format: KeyFormat) -> String {
    match format {
        KeyFormat::SnakeCase => to_snake_case(name),
        KeyFormat::CamelCase => camel_case(name),
        KeyFormat::Default => name.to_string(),
    }
}

/// File stem (without `.dart`) for a generated class.
pub fn create_file_name(class_name: &str) -> String {
    to_snake_case(class_name)
}

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref CLASS_LINE_RX:   Regex = Regex::new(r"^((abstract|base|final|interface|sealed|mixin)\s+)*class\s").unwrap();
    pub static ref ENUM_MARKER_RX:  Regex = Regex::new(r"//\s*enum").unwrap();
}

/// Splits a declaration line on spaces, keeping generic clauses attached to
/// the word they belong to, and stops at the first `{`.
///
/// `class Foo<K, V extends Bar> extends Baz {` yields
/// `["class", "Foo<K, V extends Bar>", "extends", "Baz"]`.
pub fn split_declaration(line: &str) -> Vec<String> {
    fn flush(word: &mut String, words: &mut Vec<String>) {
        let w = word.trim();
        if !w.is_empty() {
            // A detached `<...>` belongs to the previous word (`Foo <T>`).
            match words.last_mut() {
                Some(last) if w.starts_with('<') => last.push_str(w),
                _ => words.push(w.to_string()),
            }
        }
        word.clear();
    }

    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut generics = 0i32;

    for c in line.chars() {
        match c {
            '<' => generics += 1,
            '>' => generics -= 1,
            _ => {}
        }

        if generics == 0 && (c == ' ' || c == '{') {
            flush(&mut word, &mut words);
            if c == '{' {
                return words;
            }
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut words);
    words
}

/// Collapses a member signature for prefix matching: drops spaces and
/// everything inside generic brackets, so `Map<String, dynamic> toMap()`
/// becomes `MaptoMap()`. A `>` preceded by `=` (as in `=>`) is not a
/// closing bracket.
pub fn normalize_signature(src: &str) -> String {
    let mut result = String::with_capacity(src.len());
    let mut generics = 0i32;
    let mut prev = '\0';

    for c in src.chars() {
        if c == '<' {
            generics += 1;
        }
        if c != ' ' && generics == 0 {
            result.push(c);
        }
        if prev != '=' && c == '>' {
            generics -= 1;
        }
        prev = c;
    }
    result
}

pub fn is_class_line(line: &str) -> bool {
    CLASS_LINE_RX.is_match(line.trim_start())
}

/// True if `line` carries the `// enum` marker that flags the next field.
pub fn is_enum_marker(line: &str) -> bool {
    ENUM_MARKER_RX.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_generics_together() {
        let words = split_declaration("class Foo<K, V extends Bar<K>> extends Baz<V> with A, B implements C {");
        assert_eq!(
            words,
            vec!["class", "Foo<K, V extends Bar<K>>", "extends", "Baz<V>", "with", "A,", "B", "implements", "C"]
        );
    }

    #[test]
    fn test_split_attaches_detached_generic() {
        let words = split_declaration("abstract class Box <T> {");
        assert_eq!(words, vec!["abstract", "class", "Box<T>"]);
    }

    #[test]
    fn test_split_keeps_last_word_without_brace() {
        let words = split_declaration("class Person extends Base");
        assert_eq!(words, vec!["class", "Person", "extends", "Base"]);
    }

    #[test]
    fn test_normalize_signature() {
        assert_eq!(normalize_signature("  Map<String, dynamic> toMap() {"), "MaptoMap(){");
        assert_eq!(normalize_signature("Map<String, dynamic> toMap()"), "MaptoMap()");
        assert_eq!(normalize_signature("  int get hashCode => a.hashCode;"), "intgethashCode=>a.hashCode;");
        assert_eq!(normalize_signature("bool operator ==(Object other)"), "booloperator==(Objectother)");
    }

    #[test]
    fn test_class_line_detection() {
        assert!(is_class_line("class A {"));
        assert!(is_class_line("  abstract class A {"));
        assert!(is_class_line("final class A {"));
        assert!(is_class_line("sealed class Shape {"));
        assert!(is_class_line("abstract interface class Repo {"));
        assert!(is_class_line("base mixin class Logger {"));
        assert!(!is_class_line("mixin Counter {"));
        assert!(!is_class_line("classic()"));
        assert!(!is_class_line("// class A"));
    }

    #[test]
    fn test_enum_marker() {
        assert!(is_enum_marker("  // enum"));
        assert!(is_enum_marker("  //enum Status"));
        assert!(!is_enum_marker("  // status of the order"));
    }
}

//! Turns the pending edits of synthesized classes into line edits against
//! the original buffer.

use crate::{config::ProjectInfo, imports::Imports, types::DartClass, utils::remove_end};
use tracing::debug;

/// Replaces lines `start_line..end_line` (0-based, end exclusive) with
/// `text`. An empty range is an insertion before `start_line`.
///
/// `text` holds whole lines joined by `\n`, without a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start_line: usize,
    pub end_line:   usize,
    pub text:       String,
}

impl TextEdit {
    pub fn replace(start_line: usize, end_line: usize, text: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line,
            text: text.into(),
        }
    }

    pub fn insert(line: usize, text: impl Into<String>) -> Self {
        Self::replace(line, line, text)
    }

    pub fn is_insertion(&self) -> bool {
        self.start_line == self.end_line
    }
}

fn class_declaration(clazz: &DartClass) -> String {
    let mut declaration = String::new();
    for modifier in &clazz.modifiers {
        declaration.push_str(modifier);
        declaration.push(' ');
    }
    declaration.push_str(&format!("class {}{}", clazz.name, clazz.full_generic_type));
    if let Some(superclass) = &clazz.superclass {
        declaration.push_str(" extends ");
        declaration.push_str(superclass);
    }
    if clazz.has_mixins() {
        declaration.push_str(" with ");
        declaration.push_str(&clazz.mixins.join(", "));
    }
    if clazz.has_interfaces() {
        declaration.push_str(" implements ");
        declaration.push_str(&clazz.interfaces.join(", "));
    }
    declaration.push_str(" {");
    declaration
}

/// Full replacement text for the lines of `clazz`.
///
/// Lines are visited from the closing brace back to the declaration: the
/// declaration is rewritten, a new constructor goes after the last field,
/// pending insertions go before the closing brace and every line covered by
/// a replacement part is swapped for that part's text exactly once.
pub fn class_replacement(clazz: &DartClass) -> String {
    let lines: Vec<&str> = clazz.class_content.split('\n').collect();
    let first_line = clazz.starts_at_line.unwrap_or(1);
    let header_end = lines.iter().position(|l| l.contains('{')).unwrap_or(0);
    let new_constr = clazz.constr.as_deref().filter(|_| !clazz.has_constructor());
    let mut emitted = vec![false; clazz.to_replace.len()];
    let mut replacement = String::new();

    for (i, &line) in lines.iter().enumerate().rev() {
        let line_num = first_line + i;

        let piece = if i == 0 {
            format!("{}\n", class_declaration(clazz))
        } else if i <= header_end {
            // Folded into the rewritten declaration.
            String::new()
        } else if Some(line_num) == clazz.ends_at_line {
            format!("{}{}\n", clazz.to_insert, line)
        } else if let Some(index) = clazz.to_replace.iter().position(|p| p.covers(line_num)) {
            if emitted[index] {
                String::new()
            } else {
                emitted[index] = true;
                let text = clazz.to_replace[index].replacement.as_deref().unwrap_or(line);
                format!("{}\n", text)
            }
        } else {
            match new_constr {
                Some(constr) if Some(line_num) == clazz.props_end_at_line() => format!("{}\n\n{}", line, constr),
                _ => format!("{}\n", line),
            }
        };

        replacement.insert_str(0, &piece);
    }

    remove_end(&replacement, "\n").to_string()
}

/// Plans the edits for every valid, changed class plus the import block.
/// Edits never overlap and come back ordered by line.
pub fn plan_edits(classes: &[DartClass], imports: Option<&Imports>, project: &ProjectInfo) -> Vec<TextEdit> {
    let mut edits = Vec::new();

    for clazz in classes.iter().filter(|c| c.is_valid() && c.did_change()) {
        if let (Some(start), Some(end)) = (clazz.starts_at_line, clazz.ends_at_line) {
            debug!(class = %clazz.name, start, end, "planning class edit");
            edits.push(TextEdit::replace(start - 1, end, class_replacement(clazz)));
        }
    }

    if let Some(imports) = imports.filter(|i| i.has_imports() && i.did_change(project)) {
        let formatted = imports.formatted(project);
        let edit = match (imports.start_at_line, imports.end_at_line) {
            (Some(start), Some(end)) => TextEdit::replace(start - 1, end, formatted),
            _ if imports.preamble_end == 0 => TextEdit::insert(0, format!("{}\n", formatted)),
            _ => TextEdit::insert(imports.preamble_end, format!("\n{}", formatted)),
        };
        debug!(start = edit.start_line, end = edit.end_line, "planning import edit");
        edits.push(edit);
    }

    edits.sort_by_key(|e| e.start_line);
    edits
}

/// Applies `edits` to `text`, bottom-up so earlier line numbers stay valid.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.start_line.cmp(&a.start_line));

    for edit in ordered {
        let end = edit.end_line.min(lines.len());
        let start = edit.start_line.min(end);
        lines.splice(start..end, edit.text.split('\n'));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::KeyFormat,
        types::{ClassPart, Field},
    };
    use pretty_assertions::assert_eq;

    fn class(content: &str, start: usize) -> DartClass {
        let mut clazz = DartClass::new();
        clazz.name = "A".into();
        clazz.class_content = content.into();
        clazz.starts_at_line = Some(start);
        clazz.ends_at_line = Some(start + content.split('\n').count() - 1);
        clazz
    }

    #[test]
    fn test_apply_edits_bottom_up() {
        let text = "a\nb\nc\nd";
        let edits = vec![TextEdit::replace(0, 1, "A1\nA2"), TextEdit::replace(2, 4, "CD"), TextEdit::insert(1, "x")];
        assert_eq!(apply_edits(text, &edits), "A1\nA2\nx\nb\nCD");
    }

    #[test]
    fn test_replacement_spans_are_emitted_once() {
        let mut clazz = class("class A {\n  final int a;\n\n  int get x {\n    return 1;\n  }\n}", 3);
        clazz.to_replace.push(ClassPart::located("x", 6, 8, "", "  int get x => 2;".into()));
        clazz.superclass = Some("Base".into());
        assert_eq!(
            class_replacement(&clazz),
            "class A extends Base {\n  final int a;\n\n  int get x => 2;\n}"
        );
    }

    #[test]
    fn test_new_constructor_follows_last_field() {
        let mut clazz = class("class A {\n  final int a;\n}", 1);
        clazz.properties.push(Field::new("int", "a", 2, KeyFormat::Default));
        clazz.constr = Some("  A({\n    required this.a,\n  });\n".into());
        clazz.to_insert = "\n  int get b => a;\n".into();
        assert_eq!(
            class_replacement(&clazz),
            "class A {\n  final int a;\n\n  A({\n    required this.a,\n  });\n\n  int get b => a;\n}"
        );
    }

    #[test]
    fn test_wrapped_declaration_is_folded() {
        let mut clazz = class("class A\n    extends B {\n  final int a;\n}", 1);
        clazz.superclass = Some("B".into());
        clazz.mixins.push("EquatableMixin".into());
        assert_eq!(class_replacement(&clazz), "class A extends B with EquatableMixin {\n  final int a;\n}");
    }

    #[test]
    fn test_import_insertion_after_library_line() {
        let mut imports = Imports::new("library models;\n\nclass A {}\n");
        imports.requires_import("dart:convert", &[]);
        let edits = plan_edits(&[], Some(&imports), &ProjectInfo::default());
        assert_eq!(edits, vec![TextEdit::insert(1, "\nimport 'dart:convert';")]);
        assert_eq!(
            apply_edits("library models;\n\nclass A {}\n", &edits),
            "library models;\n\nimport 'dart:convert';\n\nclass A {}\n"
        );
    }
}

//! Quick fixes offered at a cursor position.

use crate::commands::normalize_line_endings;
use dart_data_class_compiler::{
    plan_edits, Config, DartClass, DataClassGenerator, Imports, Part, ProjectInfo, TextEdit,
};
use std::slice;

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAction {
    pub title: String,
    pub edits: Vec<TextEdit>,
}

impl CodeAction {
    fn new(title: &str, edits: Vec<TextEdit>) -> Self {
        Self {
            title: title.to_string(),
            edits,
        }
    }
}

/// Edit that rewrites the import block in canonical order, if it changes.
pub fn sort_imports(text: &str, project: &ProjectInfo) -> Option<TextEdit> {
    let imports = Imports::new(text);
    if !imports.has_imports() || !imports.did_change(project) {
        return None;
    }
    let (start, end) = imports.start_at_line.zip(imports.end_at_line)?;
    Some(TextEdit::replace(start - 1, end, imports.formatted(project)))
}

fn imports_fix(text: &str, line: usize, project: &ProjectInfo) -> Option<CodeAction> {
    let imports = Imports::new(text);
    let (start, end) = imports.start_at_line.zip(imports.end_at_line)?;
    if line < start || line > end {
        return None;
    }

    let edit = sort_imports(text, project)?;
    let title = match (
        imports.has_import_declaration(project),
        imports.has_export_declaration(project),
    ) {
        (true, true) => "Sort imports/exports",
        (false, true) => "Sort exports",
        _ => "Sort imports",
    };
    Some(CodeAction::new(title, vec![edit]))
}

fn class_edits(clazz: &DartClass, imports: &Imports, project: &ProjectInfo) -> Vec<TextEdit> {
    plan_edits(slice::from_ref(clazz), Some(imports), project)
}

/// Regenerates only `part` of the class named `class_name`.
fn part_fix(text: &str, config: &Config, class_name: &str, part: Part, title: &str) -> Option<CodeAction> {
    let generator = DataClassGenerator::for_part(text, config, part);
    let clazz = generator.classes.iter().find(|c| c.name == class_name)?;
    clazz
        .did_change()
        .then(|| CodeAction::new(title, class_edits(clazz, &generator.imports, &config.project)))
}

/// Quick fixes for the 1-based `line` of `text`.
///
/// Import sorting is offered inside the directive block. Member fixes are
/// offered on the declaration, field and constructor lines of a valid class.
pub fn code_actions(text: &str, line: usize, config: &Config) -> Vec<CodeAction> {
    let settings = &config.settings;
    if !settings.quick_fixes {
        return Vec::new();
    }

    let text = normalize_line_endings(text);
    let mut actions: Vec<CodeAction> = imports_fix(&text, line, &config.project).into_iter().collect();

    let generator = DataClassGenerator::new(&text, config);
    let Some(clazz) = generator.classes.iter().find(|c| {
        matches!((c.starts_at_line, c.ends_at_line), (Some(s), Some(e)) if s <= line && line <= e)
    }) else {
        return actions;
    };
    if !clazz.is_valid() {
        return actions;
    }

    let at_declaration = clazz.starts_at_line == Some(line);
    let in_properties = clazz.properties.iter().any(|p| p.line == line);
    let in_constructor = matches!(
        (clazz.constr_starts_at_line, clazz.constr_ends_at_line),
        (Some(s), Some(e)) if s <= line && line <= e
    );
    if !(at_declaration || in_properties || in_constructor) {
        return actions;
    }

    if !clazz.is_widget() && clazz.did_change() {
        actions.push(CodeAction::new(
            "Generate data class",
            class_edits(clazz, &generator.imports, &config.project),
        ));
    }

    let mut parts = Vec::new();
    if settings.constructor {
        parts.push((Part::Constructor, "Generate constructor"));
    }
    if !clazz.is_widget() {
        if !clazz.is_abstract() {
            if settings.copy_with {
                parts.push((Part::CopyWith, "Generate copyWith"));
            }
            if settings.any_flag(&["toMap.enabled", "fromMap.enabled", "toJson.enabled", "fromJson.enabled"]) {
                parts.push((Part::Serialization, "Generate JSON serialization"));
            }
        }
        if settings.to_string {
            parts.push((Part::ToString, "Generate toString"));
        }
        if clazz.uses_equatable() || settings.use_equatable {
            parts.push((Part::UseEquatable, "Generate Equatable"));
        } else if settings.any_flag(&["equality.enabled", "hashCode.enabled"]) {
            parts.push((Part::Equality, "Generate equality"));
        }
    }

    actions.extend(
        parts
            .into_iter()
            .filter_map(|(part, title)| part_fix(&text, config, &clazz.name, part, title)),
    );
    actions
}

//! The leading `import`/`export`/`part` block of a Dart file.

use crate::{
    config::ProjectInfo,
    utils::{are_strict_equal, is_blank},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Imports {
    pub values:        Vec<String>,
    /// 1-based, inclusive.
    pub start_at_line: Option<usize>,
    pub end_at_line:   Option<usize>,
    /// Number of leading `library`/license-comment lines; new directives go
    /// after them.
    pub preamble_end:  usize,
    raw_imports:       String,
    text:              String,
}

fn is_directive(line: &str) -> bool {
    line.starts_with("import") || line.starts_with("export") || line.starts_with("part")
}

impl Imports {
    pub fn new(text: &str) -> Self {
        let mut imports = Self {
            text: text.to_string(),
            ..Self::default()
        };
        imports.read_imports();
        imports
    }

    fn read_imports(&mut self) {
        for (i, line) in self.text.split('\n').enumerate() {
            let line = line.trim();

            if is_directive(line) {
                self.values.push(line.to_string());
                self.raw_imports.push_str(line);
                self.raw_imports.push('\n');
                if self.start_at_line.is_none() {
                    self.start_at_line = Some(i + 1);
                }
                self.end_at_line = Some(i + 1);
                continue;
            }

            let is_license_comment = line.starts_with("//") && self.values.is_empty();
            let is_preamble = line.starts_with("library") || is_license_comment;
            if is_preamble && self.values.is_empty() {
                self.preamble_end = i + 1;
            }
            if !is_blank(line) && !is_preamble {
                break;
            }
        }
    }

    pub fn has_imports(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn has_previous_imports(&self) -> bool {
        self.start_at_line.is_some() && self.end_at_line.is_some()
    }

    /// The directive block exactly as it appeared in the source.
    pub fn raw(&self) -> &str {
        &self.raw_imports
    }

    /// Whether sorting/grouping (or an added import) changes the block.
    pub fn did_change(&self, project: &ProjectInfo) -> bool {
        !are_strict_equal(&self.raw_imports, &self.formatted(project))
    }

    pub fn has_export_declaration(&self, project: &ProjectInfo) -> bool {
        self.formatted(project).lines().any(|l| l.starts_with("export "))
    }

    pub fn has_import_declaration(&self, project: &ProjectInfo) -> bool {
        self.formatted(project).lines().any(|l| l.starts_with("import "))
    }

    /// Canonical form: `dart:` imports, third-party packages, this
    /// project's packages, relative imports, exports, then parts. Each group
    /// is sorted and groups are separated by one blank line.
    pub fn formatted(&self, project: &ProjectInfo) -> String {
        if !self.has_imports() {
            return String::new();
        }

        let local_package = project
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| format!("package:{}", name));

        let mut dart_imports = Vec::new();
        let mut package_imports = Vec::new();
        let mut package_local_imports = Vec::new();
        let mut relative_imports = Vec::new();
        let mut exports = Vec::new();
        let mut parts = Vec::new();

        for imp in &self.values {
            let imp = imp.as_str();
            if imp.starts_with("export") {
                exports.push(imp);
            } else if imp.starts_with("part") {
                parts.push(imp);
            } else if imp.contains("dart:") {
                dart_imports.push(imp);
            } else if local_package.as_deref().is_some_and(|p| imp.contains(p)) {
                package_local_imports.push(imp);
            } else if imp.contains("package:") {
                package_imports.push(imp);
            } else {
                relative_imports.push(imp);
            }
        }

        let mut groups = Vec::new();
        for mut group in [dart_imports, package_imports, package_local_imports, relative_imports, exports, parts] {
            if group.is_empty() {
                continue;
            }
            group.sort_unstable();
            group.dedup();
            groups.push(group.join("\n"));
        }
        groups.join("\n\n")
    }

    pub fn includes(&self, imp: &str) -> bool {
        self.values.iter().any(|v| v == imp)
    }

    pub fn push(&mut self, imp: &str) {
        self.values.push(imp.to_string());
    }

    fn has_at_least_one_import(&self, imps: &[&str]) -> bool {
        imps.iter().any(|imp| {
            let directive = format!("import '{}';", imp);
            self.text.contains(&directive) || self.includes(&directive)
        })
    }

    /// Adds `import '<imp>';` unless it, or one of `valid_overrides`, is
    /// already imported.
    pub fn requires_import(&mut self, imp: &str, valid_overrides: &[&str]) {
        let formatted = if imp.starts_with("import") {
            imp.to_string()
        } else {
            format!("import '{}';", imp)
        };

        if !self.includes(&formatted) && !self.has_at_least_one_import(valid_overrides) {
            self.values.push(formatted);
        }
    }

    /// Folds the directives of `other` into this block, skipping duplicates.
    pub fn merge(&mut self, other: &Imports) {
        for imp in &other.values {
            if !self.includes(imp) {
                self.values.push(imp.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> ProjectInfo {
        ProjectInfo {
            name:       Some("my_app".into()),
            is_flutter: false,
        }
    }

    #[test]
    fn test_reads_block_after_license_comment() {
        let text = "// Copyright 2024\n\nimport 'b.dart';\nimport 'package:my_app/a.dart';\n\nclass A {\n}\n";
        let imports = Imports::new(text);
        assert_eq!(imports.values.len(), 2);
        assert_eq!(imports.start_at_line, Some(3));
        assert_eq!(imports.end_at_line, Some(4));
        assert_eq!(imports.preamble_end, 1);
    }

    #[test]
    fn test_formats_groups_in_fixed_order() {
        let text = "\
part 'a.g.dart';
export 'src/x.dart';
import 'util.dart';
import 'package:my_app/model.dart';
import 'package:equatable/equatable.dart';
import 'package:collection/collection.dart';
import 'dart:convert';
";
        let imports = Imports::new(text);
        let expected = "\
import 'dart:convert';

import 'package:collection/collection.dart';
import 'package:equatable/equatable.dart';

import 'package:my_app/model.dart';

import 'util.dart';

export 'src/x.dart';

part 'a.g.dart';";
        assert_eq!(imports.formatted(&project()), expected);
        assert!(imports.did_change(&project()));
        assert!(imports.has_export_declaration(&project()));
    }

    #[test]
    fn test_sorted_block_is_unchanged() {
        let text = "import 'dart:convert';\n\nimport 'package:equatable/equatable.dart';\n\nclass A {}\n";
        let imports = Imports::new(text);
        assert!(!imports.did_change(&project()));
    }

    #[test]
    fn test_requires_import_respects_overrides() {
        let mut imports = Imports::new("import 'package:flutter/material.dart';\n");
        imports.requires_import("dart:ui", &["package:flutter/material.dart"]);
        assert_eq!(imports.values.len(), 1);

        imports.requires_import("dart:convert", &[]);
        imports.requires_import("dart:convert", &[]);
        assert!(imports.includes("import 'dart:convert';"));
        assert_eq!(imports.values.len(), 2);
    }

    #[test]
    fn test_no_directives() {
        let imports = Imports::new("class A {\n  final int a;\n}\n");
        assert!(!imports.has_imports());
        assert!(!imports.has_previous_imports());
        assert_eq!(imports.formatted(&project()), "");
    }
}

use dart_data_class::{
    apply_edits, code_actions, generate_data_class, generate_json_data_class, Config, DataClassError, FsWriter, Host,
    Outcome, ProjectInfo, Settings, TextEdit,
};
use dart_data_class_compiler::SeparatePolicy;
use pretty_assertions::assert_eq;
use std::{collections::VecDeque, fs, io, path::PathBuf, time::Duration};
use tempfile::TempDir;

/// Scripted host: answers prompts from queues and records everything else.
struct MockHost {
    text:       String,
    language:   String,
    class_name: Option<String>,
    choices:    VecDeque<Option<Vec<usize>>>,
    writer:     FsWriter,
    fail_on:    Option<String>,
    written:    Vec<PathBuf>,
    infos:      Vec<String>,
    errors:     Vec<String>,
    progress:   f64,
    _dir:       TempDir,
}

impl MockHost {
    fn new(text: &str, language: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            text:       text.to_string(),
            language:   language.to_string(),
            class_name: None,
            choices:    VecDeque::new(),
            writer:     FsWriter::new(dir.path()),
            fail_on:    None,
            written:    Vec::new(),
            infos:      Vec::new(),
            errors:     Vec::new(),
            progress:   0.0,
            _dir:       dir,
        }
    }

    fn answering(mut self, choices: Vec<Option<Vec<usize>>>) -> Self {
        self.choices = choices.into();
        self
    }
}

impl Host for MockHost {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn language_id(&self) -> String {
        self.language.clone()
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), DataClassError> {
        self.text = apply_edits(&self.text, edits);
        Ok(())
    }

    fn prompt_text(&mut self, _placeholder: &str) -> Option<String> {
        self.class_name.clone()
    }

    fn prompt_choice(&mut self, _placeholder: &str, _options: &[String], _allow_multiple: bool) -> Option<Vec<usize>> {
        self.choices.pop_front().flatten()
    }

    fn report_progress(&mut self, increment: f64, _message: &str) {
        self.progress += increment;
    }

    fn write_file(&mut self, content: &str, name: &str) -> Result<PathBuf, DataClassError> {
        if self.fail_on.as_deref() == Some(name) {
            return Err(DataClassError::WriteFailed {
                path:   PathBuf::from(format!("{}.dart", name)),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        let path = self.writer.write(content, name)?;
        self.written.push(path.clone());
        Ok(path)
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn pause(&mut self, _duration: Duration) {}
}

fn config() -> Config {
    Config::new(Settings::default(), ProjectInfo::default())
}

/// Settings with every member except `toString` switched off.
fn to_string_only() -> Config {
    let mut settings = Settings::default();
    settings.init = false;
    settings.copy_with = false;
    settings.to_map = false;
    settings.from_map = false;
    settings.to_json = false;
    settings.from_json = false;
    settings.equality = false;
    settings.hash_code = false;
    Config::new(settings, ProjectInfo::default())
}

const BOOK_JSON: &str = r#"{
  "title": "Dune",
  "author": { "name": "Frank" }
}"#;

const POINT: &str = "\
class Point {
  final int x;
  final int y;

  Point({
    required this.x,
    required this.y,
  });

  @override
  String toString() => 'P';
}";

#[test]
fn test_generate_rewrites_the_document() {
    let mut host = MockHost::new("class Person {\n  final String name;\n}\n", "dart");
    let outcome = generate_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(host.text.starts_with("import 'dart:convert';\n\nclass Person {\n"));
    assert!(host.text.contains("  Person copyWith({\n"));
    assert!(host.errors.is_empty());
}

#[test]
fn test_generate_refuses_other_languages() {
    let mut host = MockHost::new("class Person {\n  final String name;\n}\n", "typescript");
    let outcome = generate_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(host.errors, vec!["Make sure that you're editing a dart file and then try again!"]);
    assert!(host.text.starts_with("class Person"));
}

#[test]
fn test_generate_without_classes() {
    let mut host = MockHost::new("void main() {}\n", "dart");
    let outcome = generate_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(host.errors, vec!["No convertable dart classes were detected!"]);
}

#[test]
fn test_only_chosen_classes_are_generated() {
    let text = "class A {\n  final int a;\n}\n\nclass B {\n  final int b;\n}\n";
    let mut host = MockHost::new(text, "dart").answering(vec![Some(vec![1])]);
    let outcome = generate_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(host.text.contains("class A {\n  final int a;\n}\n"));
    assert!(host.text.contains("  B({\n    required this.b,\n  });"));
}

#[test]
fn test_empty_selection_cancels() {
    let text = "class A {\n  final int a;\n}\n\nclass B {\n  final int b;\n}\n";
    let mut host = MockHost::new(text, "dart").answering(vec![None]);
    let outcome = generate_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(host.infos, vec!["No classes selected!"]);
    assert_eq!(host.text, text);
}

#[test]
fn test_manual_override_can_keep_a_member() {
    let mut config = to_string_only();
    config.settings.override_manual = true;

    // "No" to overriding toString.
    let mut host = MockHost::new(POINT, "dart").answering(vec![Some(vec![1])]);
    let outcome = generate_data_class(&mut host, &config).unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(host.text, POINT);
    assert_eq!(host.infos, vec!["No changes detected for class Point"]);

    let mut host = MockHost::new(POINT, "dart").answering(vec![Some(vec![0])]);
    let outcome = generate_data_class(&mut host, &config).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(host.text.contains("  String toString() => 'Point(x: $x, y: $y)';"));
}

#[test]
fn test_dismissed_override_prompt_cancels() {
    let mut config = to_string_only();
    config.settings.override_manual = true;

    let mut host = MockHost::new(POINT, "dart").answering(vec![None]);
    let outcome = generate_data_class(&mut host, &config).unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(host.infos, vec!["Canceled!"]);
    assert_eq!(host.text, POINT);
}

#[test]
fn test_json_in_a_json_document_is_rejected() {
    let mut host = MockHost::new(BOOK_JSON, "json");
    host.class_name = Some("Book".into());
    let outcome = generate_json_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(
        host.errors,
        vec!["Please paste the JSON directly into an empty .dart file and then try again!"]
    );
}

#[test]
fn test_json_without_class_name_cancels() {
    let mut host = MockHost::new(BOOK_JSON, "dart");
    let outcome = generate_json_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(host.text, BOOK_JSON);
}

#[test]
fn test_malformed_json_is_reported() {
    let mut host = MockHost::new("{ \"title\": ", "dart");
    host.class_name = Some("Book".into());
    let outcome = generate_json_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(host.errors, vec!["The provided JSON is malformed or couldn't be parsed!"]);
}

#[test]
fn test_json_separate_files() {
    let mut config = config();
    config.settings.separate = SeparatePolicy::Separate;

    let mut host = MockHost::new(BOOK_JSON, "dart");
    host.class_name = Some("book".into());
    let outcome = generate_json_data_class(&mut host, &config).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(host.text.contains("import 'author.dart';"));
    assert!(host.text.contains("class Book {\n  final String title;\n  final Author author;\n"));
    assert!(!host.text.contains("class Author"));
    assert!((host.progress - 100.0).abs() < 1e-9);

    assert_eq!(host.written.len(), 1);
    assert_eq!(host.written[0].file_name().unwrap(), "author.dart");
    let author = fs::read_to_string(&host.written[0]).unwrap();
    assert!(author.contains("class Author {\n  final String name;\n"));
    assert!(author.ends_with("}\n"));
}

#[test]
fn test_json_single_file_after_asking() {
    let mut host = MockHost::new(BOOK_JSON, "dart").answering(vec![Some(vec![1])]);
    host.class_name = Some("Book".into());
    let outcome = generate_json_data_class(&mut host, &config()).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(host.written.is_empty());
    assert!(host.text.starts_with("import 'dart:convert';\n\nclass Book {\n"));
    assert!(host.text.contains("\n\nclass Author {\n"));
    assert!(!host.text.contains("import 'author.dart';"));
    assert_eq!(host.text.matches("import 'dart:convert';").count(), 1);
}

#[test]
fn test_failed_file_does_not_stop_the_rest() {
    let json = r#"{
  "author": { "name": "Frank" },
  "publisher": { "city": "Philadelphia" }
}"#;
    let mut config = config();
    config.settings.separate = SeparatePolicy::Separate;

    let mut host = MockHost::new(json, "dart");
    host.class_name = Some("Book".into());
    host.fail_on = Some("author".into());
    let outcome = generate_json_data_class(&mut host, &config).unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(host.errors.len(), 1);
    assert!(host.errors[0].starts_with("Error processing author: "));
    assert_eq!(host.written.len(), 1);
    assert_eq!(host.written[0].file_name().unwrap(), "publisher.dart");
}

#[test]
fn test_code_actions_on_a_bare_class() {
    let text = "class Person {\n  final String name;\n  final int age;\n}\n";
    let config = config();

    let titles: Vec<String> = code_actions(text, 2, &config).into_iter().map(|a| a.title).collect();
    assert_eq!(
        titles,
        vec![
            "Generate data class",
            "Generate constructor",
            "Generate copyWith",
            "Generate JSON serialization",
            "Generate toString",
            "Generate equality",
        ]
    );

    // The closing brace is not a trigger line.
    assert!(code_actions(text, 4, &config).is_empty());
}

#[test]
fn test_code_actions_follow_settings() {
    let text = "class Person {\n  final String name;\n}\n";

    let mut config = config();
    config.settings.quick_fixes = false;
    assert!(code_actions(text, 1, &config).is_empty());

    let mut config = to_string_only();
    config.settings.constructor = false;
    let actions = code_actions(text, 1, &config);
    let titles: Vec<&str> = actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Generate data class", "Generate toString"]);

    let fixed = apply_edits(text, &actions[1].edits);
    assert!(fixed.contains("  String toString() => 'Person(name: $name)';"));
}

#[test]
fn test_sort_imports_action() {
    let text = "import 'package:zeta/zeta.dart';\nimport 'dart:async';\n\nclass A {}\n";
    let titles: Vec<String> = code_actions(text, 1, &config()).into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["Sort imports"]);
}

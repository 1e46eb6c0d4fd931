//! Infers data classes from a sample JSON document.

use crate::{
    config::Config,
    error::DataClassError,
    generator::DataClassGenerator,
    types::{DartClass, Field},
    utils::{camel_case, capitalize, create_file_name, remove_end, to_var_name},
};
use serde_json::Value;
use tracing::{debug, warn};

/// A class inferred from JSON together with the file it should live in.
#[derive(Debug, Clone, PartialEq)]
pub struct DartFile {
    pub clazz:   DartClass,
    /// File stem, without `.dart`.
    pub name:    String,
    pub content: String,
}

impl DartFile {
    fn new(clazz: DartClass) -> Self {
        Self {
            name: create_file_name(&clazz.name),
            content: clazz.class_content.clone(),
            clazz,
        }
    }
}

fn to_class_name(key: &str) -> String {
    capitalize(&camel_case(key))
}

/// `categories` -> `category`, `tags` -> `tag`.
fn singular(key: &str) -> String {
    match key.strip_suffix("ies") {
        Some(stem) => format!("{}y", stem),
        None => remove_end(key, "s").to_string(),
    }
}

fn primitive_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some("int"),
        Value::Number(n) => Some(if n.as_f64().is_some_and(|f| f.fract() == 0.0) { "int" } else { "double" }),
        Value::String(_) => Some("String"),
        Value::Bool(_) => Some("bool"),
        Value::Null => Some("dynamic"),
        _ => None,
    }
}

fn contains_object(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(contains_object),
        _ => false,
    }
}

pub struct JsonReader {
    pub class_name: String,
    /// Every inferred class, deduplicated, in discovery order.
    pub classes:    Vec<DartClass>,
    pub files:      Vec<DartFile>,
}

impl JsonReader {
    /// Parses `source` and infers one class per JSON object, rooted at
    /// `class_name`.
    pub fn new(source: &str, class_name: &str) -> Result<Self, DataClassError> {
        let json: Value = serde_json::from_str(source.trim()).map_err(|e| {
            debug!(error = %e, "failed to parse JSON");
            DataClassError::MalformedJson
        })?;

        match &json {
            Value::Array(_) if !contains_object(&json) => return Err(DataClassError::PrimitiveJsonArray),
            Value::Object(_) | Value::Array(_) => {}
            _ => return Err(DataClassError::MalformedJson),
        }

        let mut reader = Self {
            class_name: to_class_name(class_name),
            classes:    Vec::new(),
            files:      Vec::new(),
        };
        let root = reader.class_name.clone();
        reader.read_value(&json, &root);
        reader.remove_duplicates();
        reader.files = reader.classes.iter().cloned().map(DartFile::new).collect();

        debug!(root = %reader.class_name, classes = reader.classes.len(), "inferred classes from JSON");
        Ok(reader)
    }

    /// Type of `value` stored under `key`, generating classes for objects.
    fn infer_type(&mut self, value: &Value, key: &str) -> String {
        if let Some(primitive) = primitive_type(value) {
            return primitive.to_string();
        }

        match value {
            Value::Array(items) => match items.first() {
                Some(first) => format!("List<{}>", self.infer_type(first, &singular(key))),
                None => "List<dynamic>".to_string(),
            },
            _ => {
                let name = to_class_name(key);
                self.read_value(value, &name);
                name
            }
        }
    }

    /// Records the class for an object. A root array is wrapped in a
    /// synthetic, array-shaped class that is never output itself.
    fn read_value(&mut self, value: &Value, name: &str) {
        let mut clazz = DartClass::new();
        clazz.starts_at_line = Some(1);

        let index = self.classes.len();
        let entries: Vec<(String, &Value)> = match value {
            Value::Object(map) => {
                clazz.name = name.to_string();
                map.iter().map(|(k, v)| (k.clone(), v)).collect()
            }
            Value::Array(items) => {
                clazz.name = format!("{}s", name);
                clazz.is_array = true;
                let element = items.iter().find(|v| v.is_object()).or(items.first());
                element.map(|v| (name.to_string(), v)).into_iter().collect()
            }
            _ => return,
        };

        if !clazz.is_array {
            // Pre-order: parents come before the classes of their fields.
            self.classes.push(DartClass::new());
        }

        clazz.class_content.push_str(&format!("class {} {{\n", clazz.name));
        let mut line = 1;
        for (key, value) in entries {
            line += 1;
            let type_ = if clazz.is_array {
                match value {
                    Value::Object(_) => {
                        self.read_value(value, &key);
                        key.clone()
                    }
                    other => self.infer_type(other, &key),
                }
            } else {
                self.infer_type(value, &key)
            };

            if type_ == "dynamic" {
                warn!(class = %clazz.name, key = %key, "null JSON value typed as dynamic");
            }

            let field = Field::from_json_key(&type_, &key, line);
            clazz.class_content.push_str(&format!("  final {} {};\n", type_, to_var_name(&key)));
            clazz.properties.push(field);
        }
        clazz.ends_at_line = Some(line + 1);
        clazz.class_content.push('}');

        if !clazz.is_array {
            self.classes[index] = clazz;
        }
    }

    /// Keeps the first of every set of classes with identical bodies.
    fn remove_duplicates(&mut self) {
        let mut seen: Vec<String> = Vec::new();
        self.classes.retain(|clazz| {
            if seen.contains(&clazz.class_content) {
                debug!(class = %clazz.name, "dropping duplicate class");
                false
            } else {
                seen.push(clazz.class_content.clone());
                true
            }
        });
    }

    /// Number of inferred classes named `type_`; primitives never count.
    pub fn generated_type_count(&self, type_: &str) -> usize {
        let field = Field::from_json_key(type_, "x", 0);
        if field.is_primitive() {
            return 0;
        }
        self.classes.iter().filter(|c| c.name == field.raw_type).count()
    }

    /// Imports of the files holding the generated types `clazz` refers to.
    /// Only types with exactly one generating class are importable.
    pub fn generated_file_imports(&self, clazz: &DartClass) -> Vec<String> {
        let mut imports = Vec::new();
        for prop in &clazz.properties {
            let mut element = prop.collection_type();
            while element.is_list() {
                element = element.collection_type();
            }
            if self.generated_type_count(&element.raw_type) == 1 {
                let imp = format!("import '{}.dart';", create_file_name(&element.raw_type));
                if !imports.contains(&imp) {
                    imports.push(imp);
                }
            }
        }
        imports
    }

    /// Synthesizes members for one inferred file. In separate mode the file
    /// also imports the files of the generated types it uses.
    pub fn generator_for<'a>(&self, file: &DartFile, config: &'a Config, separate: bool) -> DataClassGenerator<'a> {
        let mut generator = DataClassGenerator::with_classes(&file.content, vec![file.clazz.clone()], config);
        if separate {
            for imp in self.generated_file_imports(&file.clazz) {
                generator.imports.push(&imp);
            }
        }
        generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field_types(clazz: &DartClass) -> Vec<(String, String)> {
        clazz
            .properties
            .iter()
            .map(|p| (p.name.clone(), p.raw_type.clone()))
            .collect()
    }

    #[test]
    fn test_nested_object_and_primitive_list() {
        let reader = JsonReader::new(r#"{"user": {"id": 1, "tags": ["a", "b"]}}"#, "response").unwrap();
        let names: Vec<&str> = reader.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Response", "User"]);
        assert_eq!(field_types(&reader.classes[0]), vec![("user".into(), "User".into())]);
        assert_eq!(
            field_types(&reader.classes[1]),
            vec![("id".into(), "int".into()), ("tags".into(), "List<String>".into())]
        );
        assert_eq!(reader.classes[1].class_content, "class User {\n  final int id;\n  final List<String> tags;\n}");
        assert_eq!(reader.classes[1].ends_at_line, Some(4));
        assert_eq!(reader.files[0].name, "response");
    }

    #[test]
    fn test_list_of_objects_is_singularized() {
        let reader = JsonReader::new(
            r#"{"categories": [{"title": "x", "score": 1.5}], "items": [], "nulls": null, "grid": [[1, 2]]}"#,
            "Shop",
        )
        .unwrap();
        assert_eq!(
            field_types(&reader.classes[0]),
            vec![
                ("categories".into(), "List<Category>".into()),
                ("items".into(), "List<dynamic>".into()),
                ("nulls".into(), "dynamic".into()),
                ("grid".into(), "List<List<int>>".into()),
            ]
        );
        assert_eq!(
            field_types(&reader.classes[1]),
            vec![("title".into(), "String".into()), ("score".into(), "double".into())]
        );
    }

    #[test]
    fn test_root_array_yields_element_class() {
        let reader = JsonReader::new(r#"[{"id": 1}, {"id": 2}]"#, "Todo").unwrap();
        assert_eq!(reader.classes.len(), 1);
        assert_eq!(reader.classes[0].name, "Todo");
        assert!(!reader.classes[0].is_array);
    }

    #[test]
    fn test_identical_classes_are_deduplicated() {
        let reader = JsonReader::new(r#"{"home": {"city": "a"}, "work": {"city": "b"}}"#, "Person").unwrap();
        let names: Vec<&str> = reader.classes.iter().map(|c| c.name.as_str()).collect();
        // `Work` has a different name, so its body differs from `Home`.
        assert_eq!(names, vec!["Person", "Home", "Work"]);

        let reader = JsonReader::new(r#"{"a": {"b": {"x": 1}}, "c": {"b": {"x": 2}}}"#, "Root").unwrap();
        let names: Vec<&str> = reader.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "A", "B", "C"]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(JsonReader::new("[1, 2, 3]", "A"), Err(DataClassError::PrimitiveJsonArray)));
        assert!(matches!(JsonReader::new("{\"a\": ", "A"), Err(DataClassError::MalformedJson)));
        assert!(matches!(JsonReader::new("42", "A"), Err(DataClassError::MalformedJson)));
    }

    #[test]
    fn test_generated_file_imports() {
        let reader = JsonReader::new(r#"{"owner": {"id": 1}, "pets": [{"name": "rex"}]}"#, "House").unwrap();
        assert_eq!(
            reader.generated_file_imports(&reader.classes[0]),
            vec!["import 'owner.dart';".to_string(), "import 'pet.dart';".to_string()]
        );
        assert_eq!(reader.generated_type_count("int"), 0);
    }
}

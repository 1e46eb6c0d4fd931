//! Member synthesis.
//!
//! For every valid class the generator computes the text of each enabled
//! derived member and either records a [`ClassPart`] replacement (when the
//! member already exists with different text) or appends it to the class's
//! insertion buffer. Nothing is touched when the existing text already
//! matches, ignoring whitespace.

use crate::{
    config::Config,
    error::DataClassError,
    imports::Imports,
    parser::parse_classes,
    tokenizer::normalize_signature,
    types::{ClassPart, CollectionKind, DartClass, Field},
    utils::{are_strict_equal, count, indent, is_blank, remove_end, remove_end_any, remove_start_any},
};
use std::{fmt, str::FromStr};
use tracing::{debug, warn};

/// Dart source of the helper class referenced by generated `fromMap` code.
pub const PARSING_UTILS: &str = r#"class ParsingUtils {
  static int parseInt(dynamic value) {
    if (value == null) return 0;
    if (value is int) return value;
    if (value is double) return value.toInt();
    if (value is String) return int.tryParse(value) ?? 0;
    return 0;
  }

  static double parseDouble(dynamic value) {
    if (value == null) return 0.0;
    if (value is double) return value;
    if (value is int) return value.toDouble();
    if (value is String) return double.tryParse(value) ?? 0.0;
    return 0.0;
  }

  static String parseString(dynamic value) {
    if (value == null) return '';
    return value.toString();
  }

  static bool parseBool(dynamic value) {
    if (value is bool) return value;
    if (value is num) return value != 0;
    if (value is String) return value.toLowerCase() == 'true';
    return false;
  }
}
"#;

const FLUTTER_LIBRARIES: [&str; 3] = [
    "package:flutter/material.dart",
    "package:flutter/cupertino.dart",
    "package:flutter/widgets.dart",
];

/// A group of members that can be regenerated on its own (quick fixes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Constructor,
    CopyWith,
    Serialization,
    ToString,
    Equality,
    UseEquatable,
}

impl Part {
    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Constructor => "constructor",
            Part::CopyWith => "copyWith",
            Part::Serialization => "serialization",
            Part::ToString => "toString",
            Part::Equality => "equality",
            Part::UseEquatable => "useEquatable",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Part {
    type Err = DataClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constructor" => Ok(Part::Constructor),
            "copyWith" => Ok(Part::CopyWith),
            "serialization" => Ok(Part::Serialization),
            "toString" => Ok(Part::ToString),
            "equality" => Ok(Part::Equality),
            "useEquatable" => Ok(Part::UseEquatable),
            other => Err(DataClassError::UnknownPart(other.to_string())),
        }
    }
}

/// Helper used by `==` for collection fields when `collection` is imported.
///
/// The narrowest helper that fits every collection field is chosen; mixed
/// kinds fall back to a `DeepCollectionEquality` comparison.
pub fn collection_equality_helper(fields: &[Field]) -> &'static str {
    let kinds: Vec<CollectionKind> = fields.iter().filter_map(Field::collection_kind).collect();
    if kinds.is_empty() {
        return "collectionEquals";
    }
    if kinds.iter().all(|k| *k == CollectionKind::List) {
        "listEquals"
    } else if kinds.iter().all(|k| *k == CollectionKind::Map) {
        "mapEquals"
    } else if kinds.iter().all(|k| *k == CollectionKind::Set) {
        "setEquals"
    } else {
        "collectionEquals"
    }
}

/// Scanner state while looking for an existing member.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scan {
    Seeking,
    SingleLine,
    MultiLine,
    Done,
}

/// Locates the member whose first line starts with `finder` (compared after
/// [`normalize_signature`]). Block members must open at class depth; `=>`
/// members run until the first line ending in `;`.
pub fn find_part(name: &str, finder: &str, clazz: &DartClass) -> Option<ClassPart> {
    let finder = normalize_signature(finder);
    let first_line = clazz.starts_at_line?;
    let mut part = ClassPart::new(name);
    let mut current = String::new();
    let mut curlies = 0i32;
    let mut state = Scan::Seeking;

    for (i, line) in clazz.class_content.split('\n').enumerate() {
        let line_num = first_line + i;
        curlies += count(line, '{') - count(line, '}');

        match state {
            Scan::Seeking => {
                if normalize_signature(line).starts_with(&finder) {
                    let single_line = line.contains("=>");
                    if single_line || curlies == 2 {
                        part.starts_at = Some(line_num);
                        current.push_str(line);
                        current.push('\n');
                        state = if single_line { Scan::SingleLine } else { Scan::MultiLine };
                    }
                }
            }
            Scan::SingleLine => {
                current.push_str(line);
                current.push('\n');
            }
            Scan::MultiLine => {
                if curlies >= 2 {
                    current.push_str(line);
                    current.push('\n');
                } else if curlies == 1 {
                    part.ends_at = Some(line_num);
                    current.push_str(line);
                    state = Scan::Done;
                }
            }
            Scan::Done => break,
        }

        if state == Scan::SingleLine && line.trim_end().ends_with(';') {
            part.ends_at = Some(line_num);
            state = Scan::Done;
        }
    }

    if part.starts_at.is_some() {
        part.current = Some(current);
    }
    part.is_valid().then_some(part)
}

/// A parameter recovered from an existing constructor.
#[derive(Debug, Clone, PartialEq)]
struct OldParam {
    name:    String,
    text:    String,
    is_this: bool,
}

/// Splits on commas outside of any bracket pair.
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn find_old_constr_properties(clazz: &DartClass) -> Vec<OldParam> {
    let Some(constr) = clazz.constr.as_deref().filter(|_| clazz.has_constructor()) else {
        return Vec::new();
    };

    let mut inner = String::new();
    let mut brackets = 0i32;
    let mut found = false;
    for c in constr.chars() {
        if c == '(' {
            if found {
                inner.push(c);
            }
            brackets += 1;
            found = true;
            continue;
        } else if c == ')' {
            brackets -= 1;
            if found && brackets == 0 {
                break;
            }
        }
        if brackets >= 1 {
            inner.push(c);
        }
    }

    let inner = remove_end_any(remove_start_any(&inner, &["{", "["]), &["}", "]"]);
    let arguments: Vec<String> = if clazz.constr_starts_at_line == clazz.constr_ends_at_line {
        split_top_level(inner)
            .into_iter()
            .filter(|arg| !is_blank(arg))
            .map(|arg| format!("{},", arg.trim()))
            .collect()
    } else {
        inner.split('\n').map(str::to_string).collect()
    };

    let mut params = Vec::new();
    for arg in arguments {
        let mut formatted = arg.replacen("required", "", 1).trim().to_string();
        if let Some(eq) = formatted.find('=') {
            formatted = formatted[..eq].trim().to_string();
        }

        let (name, is_this) = if let Some(rest) = formatted.strip_prefix("this.") {
            (Some(rest.to_string()), true)
        } else if let Some(rest) = formatted.strip_prefix("super.") {
            (Some(rest.to_string()), false)
        } else {
            let word = formatted.split(' ').nth(1).filter(|w| !is_blank(w));
            (word.map(str::to_string), false)
        };

        if let Some(name) = name {
            params.push(OldParam {
                name: remove_end(name.trim(), ",").to_string(),
                text: format!("{}\n", arg.trim()),
                is_this,
            });
        }
    }
    params
}

/// Whether a value of `field` can go into a JSON map as is. Sets never can.
fn is_json_ready(field: &Field) -> bool {
    if field.is_map() {
        true
    } else if field.is_set() {
        false
    } else if field.is_list() {
        is_json_ready(&field.collection_type())
    } else {
        field.is_primitive()
    }
}

/// Dart expression encoding the list or set held in `name`.
fn encode_collection(prop: &Field, name: &str) -> String {
    let null_safe = if prop.is_nullable() { "?" } else { "" };
    let element = prop.collection_type();
    if is_json_ready(prop) {
        name.to_string()
    } else if is_json_ready(&element) {
        format!("{}{}.toList()", name, null_safe)
    } else {
        format!("{}{}.map((x) => {}).toList()", name, null_safe, encode_value(&element, "x"))
    }
}

/// Dart expression encoding the value of type `prop` held in `name`.
fn encode_value(prop: &Field, name: &str) -> String {
    if prop.is_map() {
        return name.to_string();
    }
    if prop.is_collection() {
        return encode_collection(prop, name);
    }

    let null_safe = if prop.is_nullable() { "?" } else { "" };
    match prop.type_() {
        "DateTime" => format!("{}{}.millisecondsSinceEpoch", name, null_safe),
        "Color" => format!("{}{}.value", name, null_safe),
        "IconData" => format!("{}{}.codePoint", name, null_safe),
        _ if !prop.is_primitive() => format!("{}{}.toMap()", name, null_safe),
        _ => name.to_string(),
    }
}

fn is_value_type(type_: &str) -> bool {
    matches!(type_, "DateTime" | "Color" | "IconData")
}

/// Dart expression decoding one non-primitive value (or element) of `prop`.
fn decode_value(prop: &Field, value: &str) -> String {
    let prop = prop.collection_type();
    match prop.type_() {
        "DateTime" => format!("DateTime.fromMillisecondsSinceEpoch(ParsingUtils.parseInt({}))", value),
        "Color" => format!("Color(ParsingUtils.parseInt({}))", value),
        "IconData" => format!("IconData(ParsingUtils.parseInt({}), fontFamily: 'MaterialIcons')", value),
        other => format!("{}.fromMap({})", other, value),
    }
}

/// `ParsingUtils` helper for a primitive scalar (or element) type.
fn parse_helper(prop: &Field) -> Option<&'static str> {
    if prop.is_double() {
        Some("parseDouble")
    } else if prop.is_int() {
        Some("parseInt")
    } else {
        match prop.collection_type().type_() {
            "String" => Some("parseString"),
            "bool" => Some("parseBool"),
            _ => None,
        }
    }
}

/// Dart expression decoding one list or set element of type `element`
/// held in `value`. Returns `value` unchanged when no conversion is needed.
fn decode_element(element: &Field, value: &str) -> String {
    if element.is_map() {
        return value.to_string();
    }

    if element.is_collection() {
        let items = match decode_element(&element.collection_type(), "x") {
            inner if inner == "x" => value.to_string(),
            inner => format!("{}.map((x) => {})", value, inner),
        };
        let decoded = format!("{}.from({})", element.type_(), items);
        return if element.is_nullable() {
            format!("{} == null ? null : {}", value, decoded)
        } else {
            decoded
        };
    }

    if element.is_primitive() {
        match parse_helper(element) {
            Some(helper) => format!("ParsingUtils.{}({})", helper, value),
            None => value.to_string(),
        }
    } else {
        decode_value(element, value)
    }
}

pub struct DataClassGenerator<'a> {
    pub classes: Vec<DartClass>,
    pub imports: Imports,
    config:      &'a Config,
    part:        Option<Part>,
}

impl<'a> DataClassGenerator<'a> {
    /// Parses `text` and synthesizes every enabled member.
    pub fn new(text: &str, config: &'a Config) -> Self {
        Self::build(text, None, config, None)
    }

    /// Like [`DataClassGenerator::new`], but only regenerates `part`.
    pub fn for_part(text: &str, config: &'a Config, part: Part) -> Self {
        Self::build(text, None, config, Some(part))
    }

    /// Synthesizes members for classes that were not parsed from `text`
    /// (e.g. inferred from JSON); `text` only seeds the import block.
    pub fn with_classes(text: &str, classes: Vec<DartClass>, config: &'a Config) -> Self {
        Self::build(text, Some(classes), config, None)
    }

    fn build(text: &str, classes: Option<Vec<DartClass>>, config: &'a Config, part: Option<Part>) -> Self {
        let classes = classes.unwrap_or_else(|| parse_classes(text, config.settings.key_format));
        let mut generator = Self {
            classes,
            imports: Imports::new(text),
            config,
            part,
        };
        generator.generate_data_classes();
        generator
    }

    pub fn has_imports(&self) -> bool {
        self.imports.has_imports()
    }

    fn is_part_selected(&self, part: Part) -> bool {
        self.part.map_or(true, |p| p == part)
    }

    fn requires_import(&mut self, imp: &str, valid_overrides: &[&str]) {
        self.imports.requires_import(imp, valid_overrides);
    }

    fn generate_data_classes(&mut self) {
        let mut classes = std::mem::take(&mut self.classes);
        for clazz in classes.iter_mut() {
            self.generate_class(clazz);
        }
        self.classes = classes;
    }

    fn generate_class(&mut self, clazz: &mut DartClass) {
        if let Some(issue) = clazz.issue() {
            debug!(class = %clazz.name, %issue, "not generating members");
            return;
        }
        if clazz.has_enum_heuristics() {
            warn!(class = %clazz.name, "enum fields detected from `// enum` comments only");
        }

        let config = self.config;
        let settings = &config.settings;

        if settings.constructor && self.is_part_selected(Part::Constructor) {
            self.insert_constructor(clazz);
        }

        if clazz.is_widget() {
            return;
        }

        if !clazz.is_abstract() {
            if settings.init && self.is_part_selected(Part::Serialization) {
                self.insert_init_factory(clazz);
            }
            if settings.copy_with && self.is_part_selected(Part::CopyWith) {
                self.insert_copy_with(clazz);
            }
            if self.is_part_selected(Part::Serialization) {
                if settings.to_map {
                    self.insert_to_map(clazz);
                }
                if settings.from_map {
                    self.insert_from_map(clazz);
                }
                if settings.to_json {
                    self.insert_to_json(clazz);
                }
                if settings.from_json {
                    self.insert_from_json(clazz);
                }
            }
        }

        if settings.to_string && self.is_part_selected(Part::ToString) {
            self.insert_to_string(clazz);
        }

        if clazz.uses_equatable() || settings.use_equatable {
            if self.is_part_selected(Part::UseEquatable) {
                self.insert_equatable(clazz);
            }
        } else if self.is_part_selected(Part::Equality) {
            if settings.equality {
                self.insert_equality(clazz);
            }
            if settings.hash_code {
                self.insert_hash(clazz);
            }
        }
    }

    fn insert_constructor(&mut self, clazz: &mut DartClass) {
        let with_defaults = self.config.settings.constructor_defaults;
        let old_constr = clazz.constr.clone();

        let mut constr = String::new();
        let mut start_bracket = "({";
        let mut end_bracket = "})";

        if let Some(old) = old_constr.as_deref() {
            if old.trim_start().starts_with("const") {
                constr.push_str("const ");
            }

            let stripped = old.replacen("const", "", 1);
            let stripped = stripped.trim_start();
            start_bracket = if stripped.starts_with(&format!("{}([", clazz.name)) {
                "(["
            } else if stripped.starts_with(&format!("{}({{", clazz.name)) {
                "({"
            } else {
                "("
            };
            end_bracket = if stripped.contains("])") {
                "])"
            } else if stripped.contains("})") {
                "})"
            } else {
                ")"
            };
        } else if clazz.is_widget() {
            constr.push_str("const ");
        }

        constr.push_str(&clazz.name);
        constr.push_str(start_bracket);
        constr.push('\n');

        let old_text = old_constr.as_deref().unwrap_or("");
        let passes_super_key = old_text.contains("super.key");
        if clazz.is_widget() {
            let has_key = passes_super_key
                || old_text.split('\n').any(|line| line.trim().starts_with("Key? key"));
            if !has_key {
                constr.push_str("  Key? key,\n");
            }
        }

        let old_params = find_old_constr_properties(clazz);
        for param in old_params.iter().filter(|p| !p.is_this) {
            constr.push_str("  ");
            constr.push_str(&param.text);
        }

        let is_named = start_bracket == "({" && end_bracket == "})";
        for prop in &clazz.properties {
            if let Some(old) = old_params.iter().find(|p| p.name == prop.name) {
                if old.is_this {
                    constr.push_str("  ");
                    constr.push_str(&old.text);
                }
                continue;
            }

            let parameter = format!("this.{}", prop.name);
            let has_default = with_defaults
                && !prop.is_nullable()
                && (prop.is_primitive() || prop.is_collection())
                && prop.raw_type != "dynamic";

            if has_default {
                constr.push_str(&format!("  {} = {},\n", parameter, prop.def_value()));
            } else if is_named && !prop.is_nullable() {
                constr.push_str(&format!("  required {},\n", parameter));
            } else {
                constr.push_str(&format!("  {},\n", parameter));
            }
        }

        let std_end = if clazz.is_widget() && !passes_super_key {
            format!("{} : super(key: key);", end_bracket)
        } else {
            format!("{};", end_bracket)
        };

        match old_constr.as_deref() {
            Some(old) => {
                let ending_at = if let Some(pos) = old.find(" : ") {
                    Some(pos + 1)
                } else if old.trim_end().ends_with('{') {
                    old.rfind('{')
                } else {
                    None
                };
                match ending_at {
                    Some(i) => constr.push_str(&format!("{} {}", end_bracket, &old[i..])),
                    None => constr.push_str(&std_end),
                }
            }
            None => constr.push_str(&std_end),
        }

        if clazz.has_constructor() {
            clazz.constr_different = !are_strict_equal(old_text, &constr);
            if clazz.constr_different {
                if let (Some(start), Some(end)) = (clazz.constr_starts_at_line, clazz.constr_ends_at_line) {
                    debug!(class = %clazz.name, "replacing constructor");
                    let replacement = remove_end(&indent(&constr), "\n").to_string();
                    clazz
                        .to_replace
                        .push(ClassPart::located("constructor", start, end, old_text, replacement));
                }
            }
        } else {
            debug!(class = %clazz.name, "adding constructor");
            clazz.constr_different = true;
            clazz.constr = Some(indent(&constr));
        }
    }

    fn insert_init_factory(&mut self, clazz: &mut DartClass) {
        let named = clazz.has_named_constructor();
        let mut method = format!("factory {}.init() => {}(\n", clazz.name, clazz.type_());

        for prop in &clazz.properties {
            let default_value = if prop.is_collection() {
                if prop.is_list() { "const []".to_string() } else { "const {}".to_string() }
            } else if prop.is_enum {
                format!("{}.values.first", prop.type_())
            } else {
                match prop.type_() {
                    "int" | "num" => "0".to_string(),
                    "double" => "0.0".to_string(),
                    "String" => "''".to_string(),
                    "bool" => "false".to_string(),
                    "dynamic" => "null".to_string(),
                    "DateTime" => "DateTime.fromMillisecondsSinceEpoch(0)".to_string(),
                    "Color" => "const Color(0)".to_string(),
                    "IconData" => "IconData(0)".to_string(),
                    other => format!("{}.init()", other),
                }
            };

            let label = if named { format!("{}: ", prop.name) } else { String::new() };
            method.push_str(&format!("  {}{},\n", label, default_value));
        }
        method.push_str(");");

        let finder = format!("factory {}.init()", clazz.name);
        self.append_or_replace("init", &method, &finder, clazz);
    }

    fn insert_copy_with(&mut self, clazz: &mut DartClass) {
        let uses_value_getter = self.config.settings.copy_with_value_getter;
        let named = clazz.has_named_constructor();
        let mut needs_value_getter = false;

        let mut method = format!("{} copyWith({{\n", clazz.type_());
        for prop in &clazz.properties {
            if uses_value_getter && prop.is_nullable() {
                needs_value_getter = true;
                method.push_str(&format!("  ValueGetter<{}>? {},\n", prop.raw_type, prop.name));
            } else if prop.type_() == "dynamic" {
                method.push_str(&format!("  dynamic {},\n", prop.name));
            } else {
                method.push_str(&format!("  {}? {},\n", prop.type_(), prop.name));
            }
        }
        method.push_str("}) {\n");
        method.push_str(&format!("  return {}(\n", clazz.type_()));

        for prop in &clazz.properties {
            let label = if named { format!("{}: ", prop.name) } else { String::new() };
            if uses_value_getter && prop.is_nullable() {
                method.push_str(&format!(
                    "    {label}{n} != null ? {n}() : this.{n},\n",
                    label = label,
                    n = prop.name
                ));
            } else {
                method.push_str(&format!("    {label}{n} ?? this.{n},\n", label = label, n = prop.name));
            }
        }
        method.push_str("  );\n}");

        if needs_value_getter {
            self.requires_import(
                "package:flutter/widgets.dart",
                &["package:flutter/material.dart", "package:flutter/cupertino.dart", "package:flutter/foundation.dart"],
            );
        }

        let finder = format!("{} copyWith(", clazz.name);
        self.append_or_replace("copyWith", &method, &finder, clazz);
    }

    fn insert_to_map(&mut self, clazz: &mut DartClass) {
        let mut method = String::from("Map<String, dynamic> toMap() {\n  return {\n");

        for prop in &clazz.properties {
            let value = if prop.is_enum {
                let null_safe = if prop.is_nullable() { "?" } else { "" };
                format!("{}{}.index", prop.name, null_safe)
            } else {
                encode_value(prop, &prop.name)
            };
            method.push_str(&format!("    '{}': {},\n", prop.key, value));
        }
        method.push_str("  };\n}");

        self.append_or_replace("toMap", &method, "Map<String, dynamic> toMap()", clazz);
    }

    fn insert_from_map(&mut self, clazz: &mut DartClass) {
        if let Some(imp) = self.config.settings.parsing_utils_import.clone() {
            self.requires_import(&imp, &[]);
        }

        let named = clazz.has_named_constructor();
        let mut method = format!(
            "factory {}.fromMap(Map<String, dynamic> map) {{\n  return {}(\n",
            clazz.name,
            clazz.type_()
        );

        for prop in &clazz.properties {
            let value = format!("map['{}']", prop.key);
            let null_check = prop.is_nullable();

            let decoded = if prop.is_enum {
                format!("{}.values[ParsingUtils.parseInt({})]", prop.type_(), value)
            } else if prop.is_collection() {
                let empty = if prop.is_map() { "const {}" } else { "const []" };
                let elements = match decode_element(&prop.collection_type(), "x") {
                    _ if prop.is_map() => format!("{} ?? {}", value, empty),
                    element if element == "x" => format!("{} ?? {}", value, empty),
                    element => format!("{}?.map((x) => {}) ?? {}", value, element, empty),
                };
                format!("{}.from({})", prop.type_(), elements)
            } else if prop.is_primitive() {
                match parse_helper(prop) {
                    Some(helper) => format!("ParsingUtils.{}({})", helper, value),
                    None => value.clone(),
                }
            } else if null_check || is_value_type(prop.type_()) {
                decode_value(prop, &value)
            } else {
                format!("{} == null ? {}.init() : {}", value, prop.type_(), decode_value(prop, &value))
            };

            let label = if named { format!("{}: ", prop.name) } else { String::new() };
            if null_check {
                method.push_str(&format!("    {}{} != null ? {} : null,\n", label, value, decoded));
            } else {
                method.push_str(&format!("    {}{},\n", label, decoded));
            }
        }
        method.push_str("  );\n}");

        let finder = format!("factory {}.fromMap(Map<String, dynamic> map)", clazz.name);
        self.append_or_replace("fromMap", &method, &finder, clazz);
    }

    fn insert_to_json(&mut self, clazz: &mut DartClass) {
        self.requires_import("dart:convert", &[]);
        let method = "String toJson() => json.encode(toMap());";
        self.append_or_replace("toJson", method, "String toJson()", clazz);
    }

    fn insert_from_json(&mut self, clazz: &mut DartClass) {
        self.requires_import("dart:convert", &[]);
        let method = format!(
            "factory {name}.fromJson(String source) => {name}.fromMap(json.decode(source));",
            name = clazz.name
        );
        let finder = format!("factory {}.fromJson(String source)", clazz.name);
        self.append_or_replace("fromJson", &method, &finder, clazz);
    }

    fn insert_to_string(&mut self, clazz: &mut DartClass) {
        let fields = clazz
            .properties
            .iter()
            .map(|p| format!("{0}: ${0}", p.name))
            .collect::<Vec<_>>()
            .join(", ");

        let method = if clazz.few_props() {
            format!("@override\nString toString() => '{}({})';", clazz.name, fields)
        } else {
            format!("@override\nString toString() {{\n  return '{}({})';\n}}", clazz.name, fields)
        };

        self.append_or_replace("toString", &method, "String toString()", clazz);
    }

    fn insert_equality(&mut self, clazz: &mut DartClass) {
        let is_flutter = self.config.project.is_flutter;
        let has_collection = clazz.properties.iter().any(Field::is_collection);
        let helper = collection_equality_helper(&clazz.properties);

        if has_collection {
            if is_flutter {
                self.requires_import("package:flutter/foundation.dart", &FLUTTER_LIBRARIES);
            } else {
                self.requires_import("package:collection/collection.dart", &[]);
            }
        }

        let mut method = String::from("@override\nbool operator ==(Object other) {\n");
        method.push_str("  if (identical(this, other)) return true;\n");
        if has_collection && !is_flutter {
            method.push_str(&format!("  final {} = const DeepCollectionEquality().equals;\n", helper));
        }
        method.push('\n');
        method.push_str(&format!("  return other is {} &&\n", clazz.type_()));

        let comparisons: Vec<String> = clazz
            .properties
            .iter()
            .map(|prop| match prop.collection_kind() {
                Some(kind) => {
                    let function = if is_flutter {
                        match kind {
                            CollectionKind::Set => "setEquals",
                            CollectionKind::Map => "mapEquals",
                            CollectionKind::List => "listEquals",
                        }
                    } else {
                        helper
                    };
                    format!("    {}(other.{n}, {n})", function, n = prop.name)
                }
                None => format!("    other.{n} == {n}", n = prop.name),
            })
            .collect();
        method.push_str(&comparisons.join(" &&\n"));
        method.push_str(";\n}");

        self.append_or_replace("equality", &method, "bool operator ==", clazz);
    }

    fn insert_hash(&mut self, clazz: &mut DartClass) {
        let use_jenkins = self.config.settings.hash_code_jenkins;
        let short = !use_jenkins && clazz.few_props();

        let mut method = String::from("@override\nint get hashCode ");
        method.push_str(if short { "=>" } else { "{\n  return " });

        if use_jenkins {
            self.requires_import("dart:ui", &FLUTTER_LIBRARIES);
            method.push_str("hashList([\n");
            for prop in &clazz.properties {
                method.push_str(&format!("    {},\n", prop.name));
            }
            method.push_str("  ]);");
        } else {
            let separator = if short { " ^ " } else { " ^\n    " };
            let hashes = clazz
                .properties
                .iter()
                .map(|p| format!("{}.hashCode", p.name))
                .collect::<Vec<_>>()
                .join(separator);
            if short {
                method.push(' ');
            }
            method.push_str(&hashes);
            method.push(';');
        }

        if !short {
            method.push_str("\n}");
        }

        self.append_or_replace("hashCode", &method, "int get hashCode", clazz);
    }

    fn add_equatable_details(&mut self, clazz: &mut DartClass) {
        if clazz.superclass.as_deref().is_some_and(|s| s.contains("Base")) {
            return;
        }

        self.requires_import("package:equatable/equatable.dart", &[]);

        if !clazz.uses_equatable() {
            if clazz.has_superclass() {
                clazz.add_mixin("EquatableMixin");
            } else {
                clazz.superclass = Some("Equatable".to_string());
            }
        }
    }

    fn insert_equatable(&mut self, clazz: &mut DartClass) {
        self.add_equatable_details(clazz);

        let has_nullable = clazz.properties.iter().any(Field::is_nullable);
        let element = if has_nullable { "Object?" } else { "Object" };
        let names: Vec<&str> = clazz.properties.iter().map(|p| p.name.as_str()).collect();

        let method = if names.len() <= 4 {
            format!("@override\nList<{}> get props => [{}];", element, names.join(", "))
        } else {
            let items: String = names.iter().map(|n| format!("    {},\n", n)).collect();
            format!("@override\nList<{}> get props {{\n  return [\n{}  ];\n}}", element, items)
        };

        self.append_or_replace("props", &method, "List<Object> get props", clazz);
    }

    fn append_or_replace(&self, name: &str, method: &str, finder: &str, clazz: &mut DartClass) {
        let replacement = remove_end(&indent(&method.replacen("@override\n", "", 1)), "\n").to_string();

        match find_part(name, finder, clazz) {
            Some(mut part) => {
                let unchanged = part
                    .current
                    .as_deref()
                    .is_some_and(|current| are_strict_equal(current, &replacement));
                if unchanged {
                    debug!(class = %clazz.name, member = name, "member is up to date");
                } else {
                    debug!(class = %clazz.name, member = name, start = ?part.starts_at, "replacing member");
                    part.replacement = Some(replacement);
                    clazz.to_replace.push(part);
                }
            }
            None => {
                debug!(class = %clazz.name, member = name, "appending member");
                clazz.to_insert.push('\n');
                clazz.to_insert.push_str(&indent(method));
            }
        }
    }
}

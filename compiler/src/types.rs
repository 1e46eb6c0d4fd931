use crate::{
    config::KeyFormat,
    error::ClassIssue,
    utils::{to_var_name, var_to_key},
};
use std::collections::HashSet;

/// Supertypes that mark a Flutter widget.
pub const WIDGET_SUPERCLASSES: [&str; 2] = ["StatelessWidget", "StatefulWidget"];

/// Collection classification of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Map,
    Set,
}

/// One typed member of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared type, possibly ending in `?`.
    pub raw_type: String,
    pub name:     String,
    /// Key used by `toMap`/`fromMap`.
    pub key:      String,
    pub line:     usize,
    pub is_final: bool,
    pub is_const: bool,
    /// Back-filled from a `// enum` comment on the preceding line.
    pub is_enum:  bool,
}

impl Field {
    /// A member parsed from source; the key is derived from the member name.
    pub fn new(raw_type: &str, name: &str, line: usize, key_format: KeyFormat) -> Self {
        let name = to_var_name(name);
        Self {
            raw_type: raw_type.to_string(),
            key: var_to_key(&name, key_format),
            name,
            line,
            is_final: true,
            is_const: false,
            is_enum:  false,
        }
    }

    /// A member inferred from a JSON property; the key stays the JSON key.
    pub fn from_json_key(raw_type: &str, key: &str, line: usize) -> Self {
        Self {
            raw_type: raw_type.to_string(),
            name:     to_var_name(key),
            key:      key.to_string(),
            line,
            is_final: true,
            is_const: false,
            is_enum:  false,
        }
    }

    /// Declared type without the nullability marker.
    pub fn type_(&self) -> &str {
        self.raw_type.strip_suffix('?').unwrap_or(&self.raw_type)
    }

    pub fn is_nullable(&self) -> bool {
        self.raw_type.ends_with('?')
    }

    fn is_collection_type(&self, collection: &str) -> bool {
        self.raw_type == collection
            || self
                .raw_type
                .strip_prefix(collection)
                .is_some_and(|rest| rest.starts_with('<'))
    }

    pub fn is_list(&self) -> bool {
        self.is_collection_type("List")
    }

    pub fn is_map(&self) -> bool {
        self.is_collection_type("Map")
    }

    pub fn is_set(&self) -> bool {
        self.is_collection_type("Set")
    }

    pub fn is_collection(&self) -> bool {
        self.collection_kind().is_some()
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        if self.is_list() {
            Some(CollectionKind::List)
        } else if self.is_map() {
            Some(CollectionKind::Map)
        } else if self.is_set() {
            Some(CollectionKind::Set)
        } else {
            None
        }
    }

    /// Element of a `List`/`Set`; any other field is its own element.
    pub fn collection_type(&self) -> Field {
        let collection = if self.is_set() {
            "Set"
        } else if self.is_list() {
            "List"
        } else {
            return self.clone();
        };

        let element = self
            .type_()
            .strip_prefix(collection)
            .and_then(|rest| rest.strip_prefix('<'))
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or("dynamic")
            .to_string();

        Field {
            raw_type: element,
            is_enum: false,
            ..self.clone()
        }
    }

    /// Maps, scalars that need no `toMap()`, and lists/sets of those at any
    /// depth.
    pub fn is_primitive(&self) -> bool {
        if self.is_map() {
            return true;
        }
        let element = self.collection_type();
        if element.is_collection() {
            return element.is_primitive();
        }
        matches!(element.type_(), "String" | "num" | "int" | "double" | "dynamic" | "bool")
    }

    pub fn is_int(&self) -> bool {
        self.collection_type().type_() == "int"
    }

    pub fn is_double(&self) -> bool {
        self.collection_type().type_() == "double"
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Literal used for defaulted constructor parameters and absent values.
    pub fn def_value(&self) -> String {
        if self.is_list() {
            return "const []".to_string();
        }
        if self.is_map() || self.is_set() {
            return "const {}".to_string();
        }
        match self.type_() {
            "String" => "''".to_string(),
            "num" | "int" => "0".to_string(),
            "double" => "0.0".to_string(),
            "bool" => "false".to_string(),
            "dynamic" => "null".to_string(),
            other => format!("{}.init()", other),
        }
    }
}

/// A located existing member together with the text that should replace it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassPart {
    pub name:        String,
    pub starts_at:   Option<usize>,
    pub ends_at:     Option<usize>,
    pub current:     Option<String>,
    pub replacement: Option<String>,
}

impl ClassPart {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn located(name: &str, starts_at: usize, ends_at: usize, current: &str, replacement: String) -> Self {
        Self {
            name:        name.to_string(),
            starts_at:   Some(starts_at),
            ends_at:     Some(ends_at),
            current:     Some(current.to_string()),
            replacement: Some(replacement),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.starts_at.is_some() && self.ends_at.is_some() && self.current.is_some()
    }

    pub fn covers(&self, line: usize) -> bool {
        matches!((self.starts_at, self.ends_at), (Some(s), Some(e)) if s <= line && line <= e)
    }
}

/// One parsed or synthesized class declaration.
///
/// Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DartClass {
    pub name:                  String,
    /// Keywords before `class`, e.g. `["abstract", "interface"]`.
    pub modifiers:             Vec<String>,
    /// Raw generic clause including bounds, e.g. `<T extends Object>`.
    pub full_generic_type:     String,
    pub superclass:            Option<String>,
    pub interfaces:            Vec<String>,
    pub mixins:                Vec<String>,
    /// Text of the existing constructor, or the generated one if there was none.
    pub constr:                Option<String>,
    pub properties:            Vec<Field>,
    pub starts_at_line:        Option<usize>,
    pub ends_at_line:          Option<usize>,
    pub constr_starts_at_line: Option<usize>,
    pub constr_ends_at_line:   Option<usize>,
    pub constr_different:      bool,
    /// Set for the synthetic wrapper of a JSON array.
    pub is_array:              bool,
    pub class_content:         String,
    pub to_insert:             String,
    pub to_replace:            Vec<ClassPart>,
}

impl DartClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic clause with `extends` bounds removed, e.g. `<T>`.
    pub fn generic_type(&self) -> String {
        if self.full_generic_type.is_empty() {
            return String::new();
        }
        let parts: Vec<&str> = self.full_generic_type.split(',').collect();
        let last = parts.len() - 1;
        parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let mut part = part.trim().to_string();
                if let Some(pos) = part.find("extends") {
                    part = part[..pos].trim().to_string();
                    if i == last {
                        part.push('>');
                    }
                }
                part
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Name plus generic usage, e.g. `Box<T>`.
    pub fn type_(&self) -> String {
        format!("{}{}", self.name, self.generic_type())
    }

    pub fn props_end_at_line(&self) -> Option<usize> {
        self.properties.last().map(|p| p.line)
    }

    pub fn has_superclass(&self) -> bool {
        self.superclass.is_some()
    }

    pub fn class_detected(&self) -> bool {
        self.starts_at_line.is_some()
    }

    pub fn has_ending(&self) -> bool {
        self.ends_at_line.is_some()
    }

    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    pub fn few_props(&self) -> bool {
        self.properties.len() <= 3
    }

    pub fn did_change(&self) -> bool {
        !self.to_insert.is_empty() || !self.to_replace.is_empty() || self.constr_different
    }

    /// Whether the constructor takes named (`{...}`) parameters. A class
    /// without a constructor gets a named one, so this defaults to true.
    pub fn has_named_constructor(&self) -> bool {
        match &self.constr {
            Some(constr) => constr
                .replacen("const", "", 1)
                .trim_start()
                .starts_with(&format!("{}({{", self.name)),
            None => true,
        }
    }

    pub fn has_constructor(&self) -> bool {
        self.constr_starts_at_line.is_some()
            && self.constr_ends_at_line.is_some()
            && self.constr.is_some()
    }

    pub fn has_mixins(&self) -> bool {
        !self.mixins.is_empty()
    }

    pub fn has_interfaces(&self) -> bool {
        !self.interfaces.is_empty()
    }

    pub fn is_widget(&self) -> bool {
        self.superclass
            .as_deref()
            .is_some_and(|s| WIDGET_SUPERCLASSES.contains(&s))
    }

    pub fn is_state(&self) -> bool {
        !self.is_widget()
            && self
                .superclass
                .as_deref()
                .is_some_and(|s| s.starts_with("State<"))
    }

    /// Abstract and sealed classes can't be instantiated.
    pub fn is_abstract(&self) -> bool {
        self.modifiers.iter().any(|m| m == "abstract" || m == "sealed")
    }

    pub fn uses_equatable(&self) -> bool {
        self.superclass.as_deref() == Some("Equatable")
            || self.mixins.iter().any(|m| m == "EquatableMixin")
    }

    pub fn unique_prop_names(&self) -> bool {
        let mut seen = HashSet::new();
        self.properties.iter().all(|p| seen.insert(p.name.as_str()))
    }

    /// Enum detection relies on a comment marker, so such classes are
    /// reported with lower confidence by callers.
    pub fn has_enum_heuristics(&self) -> bool {
        self.properties.iter().any(|p| p.is_enum)
    }

    pub fn is_valid(&self) -> bool {
        self.class_detected() && self.has_ending() && self.has_properties() && self.unique_prop_names()
    }

    pub fn issue(&self) -> Option<ClassIssue> {
        if !self.has_properties() {
            Some(ClassIssue::NoProperties(self.name.clone()))
        } else if !self.has_ending() {
            Some(ClassIssue::NoEnding(self.name.clone()))
        } else if !self.unique_prop_names() {
            Some(ClassIssue::DuplicatePropertyNames(self.name.clone()))
        } else {
            None
        }
    }

    /// Replacement text of the named span covering `line`, if any.
    pub fn replacement_at_line(&self, line: usize) -> Option<&str> {
        self.to_replace
            .iter()
            .find(|part| part.covers(line))
            .and_then(|part| part.replacement.as_deref())
    }

    pub fn add_mixin(&mut self, mixin: &str) {
        if !self.mixins.iter().any(|m| m == mixin) {
            self.mixins.push(mixin.to_string());
        }
    }

    pub fn add_interface(&mut self, interface: &str) {
        if !self.interfaces.iter().any(|i| i == interface) {
            self.interfaces.push(interface.to_string());
        }
    }
}

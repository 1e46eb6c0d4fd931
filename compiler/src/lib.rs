//! dart-data-class-compiler
//!
//! This crate implements:
//!  1) A line-based parser for Dart class declarations (`parse_classes`),
//!  2) The class, field and import-block models the generator works on,
//!  3) Member synthesis (`DataClassGenerator`: constructor, `copyWith`,
//!     map/JSON serialization, `toString`, equality, `hashCode`, Equatable),
//!  4) Class inference from sample JSON (`JsonReader`),
//!  5) An edit planner that turns pending changes into line edits,
//!  6) Settings/project configuration and error types (`DataClassError`).

pub mod config;
pub mod error;
pub mod generator;
pub mod imports;
pub mod json_reader;
pub mod parser;
pub mod planner;
pub mod tokenizer;
pub mod types;
pub mod utils;

pub use config::{Config, KeyFormat, ProjectInfo, SeparatePolicy, Settings};
pub use error::{ClassIssue, DataClassError};
pub use generator::{DataClassGenerator, Part, PARSING_UTILS};
pub use imports::Imports;
pub use json_reader::{DartFile, JsonReader};
pub use parser::parse_classes;
pub use planner::{apply_edits, class_replacement, plan_edits, TextEdit};
pub use types::{ClassPart, DartClass, Field};

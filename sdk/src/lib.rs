//! dart-data-class
//!
//! Front-end support for the Dart data class generator.
//!
//! - [`Host`]: the capabilities an editor or CLI provides (document text,
//!   edits, prompts, progress, file writes),
//! - `generate_data_class` / `generate_json_data_class`: the commands that
//!   drive the compiler crate through a host,
//! - `code_actions`: quick fixes at a cursor line,
//! - [`FsWriter`]: writes generated files with collision-free names.

pub mod actions;
pub mod commands;
pub mod host;
pub mod writer;

pub use actions::{code_actions, sort_imports, CodeAction};
pub use commands::{generate_data_class, generate_json_data_class, generate_members, normalize_line_endings, Outcome};
pub use host::Host;
pub use writer::FsWriter;

pub use dart_data_class_compiler::{apply_edits, Config, DataClassError, ProjectInfo, Settings, TextEdit};

pub mod error {
    pub use dart_data_class_compiler::error::{ClassIssue, DataClassError};
}

pub mod generator {
    pub use dart_data_class_compiler::generator::{DataClassGenerator, Part, PARSING_UTILS};
}

use dart_data_class_compiler::{DataClassError, TextEdit};
use std::{path::PathBuf, thread, time::Duration};

/// What the generator needs from an editor (or any other front end).
///
/// Prompts return `None` when the user cancels.
pub trait Host {
    /// Full text of the active document.
    fn text(&self) -> String;

    /// Language of the active document; only `dart` documents are touched.
    fn language_id(&self) -> String;

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), DataClassError>;

    fn prompt_text(&mut self, placeholder: &str) -> Option<String>;

    /// Indices of the chosen `options`.
    fn prompt_choice(&mut self, placeholder: &str, options: &[String], allow_multiple: bool) -> Option<Vec<usize>>;

    fn report_progress(&mut self, increment: f64, message: &str);

    /// Writes `<name>.dart` next to the active document and returns the
    /// path actually used.
    fn write_file(&mut self, content: &str, name: &str) -> Result<PathBuf, DataClassError>;

    fn info(&mut self, message: &str);

    fn error(&mut self, message: &str);

    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Asks a yes/no question. `None` if cancelled.
pub(crate) fn confirm<H: Host + ?Sized>(host: &mut H, question: &str) -> Option<bool> {
    let options = ["Yes".to_string(), "No".to_string()];
    let choice = host.prompt_choice(question, &options, false)?;
    choice.first().map(|&i| i == 0)
}

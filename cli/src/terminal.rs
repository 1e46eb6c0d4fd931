use dart_data_class::{apply_edits, DataClassError, FsWriter, Host, TextEdit};
use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};

/// A [`Host`] backed by one file on disk and the terminal.
///
/// Edits are applied to an in-memory copy; [`TerminalHost::finish`] writes
/// it to the output path (or stdout). Prompts read from stdin unless
/// `assume_yes` is set, in which case every question is answered with
/// "yes" and every multi-choice with "all".
pub struct TerminalHost {
    text:       String,
    language:   String,
    output:     PathBuf,
    writer:     FsWriter,
    class_name: Option<String>,
    assume_yes: bool,
    to_stdout:  bool,
    dirty:      bool,
}

fn language_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn read_answer(prompt: &str) -> Option<String> {
    eprint!("{} ", prompt);
    io::stderr().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let answer = line.trim();
    (!answer.is_empty()).then(|| answer.to_string())
}

impl TerminalHost {
    /// Edits `input` in place.
    pub fn open(input: &Path, assume_yes: bool) -> Result<Self, DataClassError> {
        Self::open_into(input, input, assume_yes)
    }

    /// Reads `input` but writes the result (and any extra files) to `output`.
    pub fn open_into(input: &Path, output: &Path, assume_yes: bool) -> Result<Self, DataClassError> {
        let text = fs::read_to_string(input)?;
        let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self {
            text,
            language: language_of(output),
            output: output.to_path_buf(),
            writer: FsWriter::new(dir),
            class_name: None,
            assume_yes,
            to_stdout: false,
            dirty: false,
        })
    }

    pub fn with_class_name(mut self, name: Option<String>) -> Self {
        self.class_name = name;
        self
    }

    pub fn with_stdout(mut self, to_stdout: bool) -> Self {
        self.to_stdout = to_stdout;
        self
    }

    /// Writes the edited document, if anything changed.
    pub fn finish(&self) -> Result<(), DataClassError> {
        if !self.dirty {
            return Ok(());
        }
        if self.to_stdout {
            print!("{}", self.text);
            return Ok(());
        }
        fs::write(&self.output, &self.text).map_err(|source| DataClassError::WriteFailed {
            path: self.output.clone(),
            source,
        })?;
        println!("Updated {}", self.output.display());
        Ok(())
    }
}

impl Host for TerminalHost {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn language_id(&self) -> String {
        self.language.clone()
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), DataClassError> {
        debug!(edits = edits.len(), "applying edits");
        self.text = apply_edits(&self.text, edits);
        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.dirty = true;
        Ok(())
    }

    fn prompt_text(&mut self, placeholder: &str) -> Option<String> {
        self.class_name.clone().or_else(|| read_answer(placeholder))
    }

    fn prompt_choice(&mut self, placeholder: &str, options: &[String], allow_multiple: bool) -> Option<Vec<usize>> {
        if self.assume_yes {
            return Some(if allow_multiple { (0..options.len()).collect() } else { vec![0] });
        }

        eprintln!("{}", placeholder);
        for (i, option) in options.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, option);
        }
        let hint = if allow_multiple { "Numbers separated by commas, or `all`:" } else { "Number:" };
        let answer = read_answer(hint)?;
        if allow_multiple && answer.eq_ignore_ascii_case("all") {
            return Some((0..options.len()).collect());
        }

        let chosen: Vec<usize> = answer
            .split(',')
            .filter_map(|n| n.trim().parse::<usize>().ok())
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| n - 1)
            .collect();
        match chosen.as_slice() {
            [] => None,
            [first, ..] if !allow_multiple => Some(vec![*first]),
            _ => Some(chosen),
        }
    }

    fn report_progress(&mut self, increment: f64, message: &str) {
        info!(increment, "{}", message);
    }

    fn write_file(&mut self, content: &str, name: &str) -> Result<PathBuf, DataClassError> {
        let path = self.writer.write(content, name)?;
        println!("Created {}", path.display());
        Ok(path)
    }

    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn pause(&mut self, _duration: Duration) {}
}

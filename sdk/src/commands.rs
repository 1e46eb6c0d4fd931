//! The two generate commands, driven through a [`Host`].

use crate::host::{confirm, Host};
use dart_data_class_compiler::{
    class_replacement, plan_edits, Config, DartClass, DataClassError, DataClassGenerator, Imports, JsonReader,
    Part, ProjectInfo, SeparatePolicy, TextEdit,
};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const NOT_DART: &str = "Make sure that you're editing a dart file and then try again!";
pub const JSON_IN_JSON_FILE: &str = "Please paste the JSON directly into an empty .dart file and then try again!";
pub const NO_CLASSES: &str = "No convertable dart classes were detected!";
pub const NO_SELECTION: &str = "No classes selected!";

/// Pause between generated files so the host can keep up.
const FILE_PAUSE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The document was edited and/or files were written.
    Applied,
    /// Everything was already up to date.
    Unchanged,
    /// The user dismissed a prompt.
    Cancelled,
    /// The command could not run on this document; the host was told why.
    Aborted,
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn choose_classes<H: Host + ?Sized>(host: &mut H, classes: Vec<DartClass>) -> Option<Vec<DartClass>> {
    let names: Vec<String> = classes.iter().map(|c| c.name.clone()).collect();
    let chosen = host.prompt_choice(
        "Please select the classes you want to generate data classes of.",
        &names,
        true,
    )?;
    if chosen.is_empty() {
        return None;
    }

    Some(
        classes
            .into_iter()
            .enumerate()
            .filter(|(i, _)| chosen.contains(i))
            .map(|(_, clazz)| clazz)
            .collect(),
    )
}

/// Reports invalid classes as errors and up-to-date ones as one notice.
fn report_classes<H: Host + ?Sized>(host: &mut H, classes: &[DartClass]) {
    let mut unchanged = Vec::new();
    for clazz in classes {
        match clazz.issue() {
            Some(issue) => host.error(&issue.to_string()),
            None if !clazz.did_change() => unchanged.push(clazz.name.as_str()),
            None => {}
        }
    }

    if !unchanged.is_empty() {
        let subject = match unchanged.as_slice() {
            [name] => format!("class {}", name),
            names => format!("classes {}", names.join(", ")),
        };
        host.info(&format!("No changes detected for {}", subject));
    }
}

/// Regenerates the data class members of the classes in the active document.
///
/// With two or more classes the user picks which to regenerate. With
/// `override.manual` every replacement of an existing member is confirmed.
pub fn generate_data_class<H: Host + ?Sized>(host: &mut H, config: &Config) -> Result<Outcome, DataClassError> {
    generate_members(host, config, None)
}

/// Like [`generate_data_class`], restricted to one member group when `part`
/// is set.
pub fn generate_members<H: Host + ?Sized>(
    host: &mut H,
    config: &Config,
    part: Option<Part>,
) -> Result<Outcome, DataClassError> {
    if host.language_id() != "dart" {
        host.error(NOT_DART);
        return Ok(Outcome::Aborted);
    }

    let text = normalize_line_endings(&host.text());
    let mut generator = match part {
        Some(part) => DataClassGenerator::for_part(&text, config, part),
        None => DataClassGenerator::new(&text, config),
    };
    let mut classes = std::mem::take(&mut generator.classes);

    if classes.is_empty() {
        host.error(NO_CLASSES);
        return Ok(Outcome::Aborted);
    }

    if classes.len() >= 2 {
        match choose_classes(host, classes) {
            Some(chosen) => classes = chosen,
            None => {
                host.info(NO_SELECTION);
                return Ok(Outcome::Cancelled);
            }
        }
    }

    if config.settings.override_manual {
        for clazz in classes.iter_mut().filter(|c| c.is_valid() && !c.to_replace.is_empty()) {
            let mut kept = Vec::new();
            for replacement in std::mem::take(&mut clazz.to_replace) {
                match confirm(host, &format!("Do you want to override {}?", replacement.name)) {
                    Some(true) => kept.push(replacement),
                    Some(false) => debug!(class = %clazz.name, member = %replacement.name, "keeping existing member"),
                    None => {
                        host.info("Canceled!");
                        return Ok(Outcome::Cancelled);
                    }
                }
            }
            clazz.to_replace = kept;
        }
    }

    report_classes(host, &classes);

    let edits = plan_edits(&classes, Some(&generator.imports), &config.project);
    if edits.is_empty() {
        return Ok(Outcome::Unchanged);
    }

    info!(edits = edits.len(), "applying data class edits");
    host.apply_edits(&edits)?;
    Ok(Outcome::Applied)
}

fn with_imports(imports: &Imports, body: &str, project: &ProjectInfo) -> String {
    let formatted = imports.formatted(project);
    if formatted.is_empty() {
        body.to_string()
    } else {
        format!("{}\n\n{}", formatted, body)
    }
}

/// Turns the JSON in the active document into data classes.
///
/// In separate mode the first class replaces the document and every other
/// class is written to its own file; otherwise all classes replace the
/// document. A failed file is reported and the rest are still processed.
pub fn generate_json_data_class<H: Host + ?Sized>(host: &mut H, config: &Config) -> Result<Outcome, DataClassError> {
    match host.language_id().as_str() {
        "dart" => {}
        "json" => {
            host.error(JSON_IN_JSON_FILE);
            return Ok(Outcome::Aborted);
        }
        _ => {
            host.error(NOT_DART);
            return Ok(Outcome::Aborted);
        }
    }

    let Some(name) = host
        .prompt_text("Please type in a class name.")
        .filter(|name| !name.trim().is_empty())
    else {
        return Ok(Outcome::Cancelled);
    };

    let text = normalize_line_endings(&host.text());
    let reader = match JsonReader::new(&text, name.trim()) {
        Ok(reader) => reader,
        Err(e) => {
            host.error(&e.to_string());
            return Ok(Outcome::Aborted);
        }
    };

    let separate = if reader.files.len() >= 2 {
        match config.settings.separate {
            SeparatePolicy::Separate => true,
            SeparatePolicy::Single => false,
            SeparatePolicy::Ask => match confirm(host, "Do you wish to separate the JSON into multiple files?") {
                Some(separate) => separate,
                None => return Ok(Outcome::Cancelled),
            },
        }
    } else {
        true
    };

    info!(class = %reader.class_name, files = reader.files.len(), separate, "generating JSON data classes");
    commit_json(host, config, &reader, &text, separate)?;
    Ok(Outcome::Applied)
}

fn commit_json<H: Host + ?Sized>(
    host: &mut H,
    config: &Config,
    reader: &JsonReader,
    text: &str,
    separate: bool,
) -> Result<(), DataClassError> {
    let document_lines = text.split('\n').count();
    let total = reader.files.len();
    let mut merged_imports = Imports::default();
    let mut bodies = Vec::with_capacity(total);

    for (i, file) in reader.files.iter().enumerate() {
        let generator = reader.generator_for(file, config, separate);
        host.report_progress(100.0 / total as f64, &format!("Creating file {}...", file.name));
        let replacement = generator.classes.first().map(class_replacement).unwrap_or_default();

        if separate {
            let content = with_imports(&generator.imports, &replacement, &config.project);
            let written = if i == 0 {
                host.apply_edits(&[TextEdit::replace(0, document_lines, content)])
            } else {
                host.write_file(&format!("{}\n", content), &file.name)
                    .map(|path| debug!(path = %path.display(), "created file"))
            };

            if let Err(e) = written {
                warn!(file = %file.name, error = %e, "failed to create file");
                host.error(&format!("Error processing {}: {}", file.name, e));
                continue;
            }
        } else {
            merged_imports.merge(&generator.imports);
            bodies.push(replacement);
        }

        host.pause(FILE_PAUSE);
    }

    if !separate {
        let content = with_imports(&merged_imports, &bodies.join("\n\n"), &config.project);
        host.apply_edits(&[TextEdit::replace(0, document_lines, content)])?;
    }
    Ok(())
}

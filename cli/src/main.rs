use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dart_data_class::{
    code_actions, generate_json_data_class, generate_members, sort_imports, Config, DataClassError, Host, Outcome,
    ProjectInfo, Settings,
};
use dart_data_class_compiler::{Part, PARSING_UTILS};

mod terminal;
use terminal::TerminalHost;

#[derive(Parser)]
#[command(name = "ddc")]
#[command(about = "Generate Dart data class boilerplate from classes or JSON", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with `dart-data-class-generator.*` settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Dart project root (defaults to the nearest directory with a pubspec.yaml)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate data class members of the classes in a `.dart` file
    Generate {
        /// Input `.dart` file, edited in place
        input: PathBuf,

        /// Only regenerate one member group (constructor, copyWith,
        /// serialization, toString, equality, useEquatable)
        #[arg(long)]
        part: Option<Part>,

        /// Answer every prompt with yes / all
        #[arg(short, long)]
        yes: bool,

        /// Print the result instead of writing the file
        #[arg(long)]
        stdout: bool,
    },

    /// Generate data classes from a JSON sample
    FromJson {
        /// Input JSON file
        input: PathBuf,

        /// Name of the root class
        #[arg(short, long)]
        name: Option<String>,

        /// Output `.dart` file (defaults to the input with a `.dart` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Answer every prompt with yes
        #[arg(short, long)]
        yes: bool,
    },

    /// Group and sort the import/export/part block of a `.dart` file
    SortImports {
        /// Input `.dart` file, edited in place
        input: PathBuf,

        /// Print the result instead of writing the file
        #[arg(long)]
        stdout: bool,
    },

    /// List (or apply) the quick fixes available on a line
    Actions {
        /// Input `.dart` file
        input: PathBuf,

        /// 1-based line number
        #[arg(short, long)]
        line: usize,

        /// Title of the quick fix to apply
        #[arg(long)]
        apply: Option<String>,
    },

    /// Print (or write) the `ParsingUtils` helper used by generated `fromMap`
    ParsingUtils {
        /// Output `.dart` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Nearest ancestor of `start` holding a `pubspec.yaml`, else its directory.
fn find_project_root(start: &Path) -> PathBuf {
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    let dir = if start.is_dir() { start.as_path() } else { start.parent().unwrap_or(Path::new(".")) };
    dir.ancestors()
        .find(|candidate| candidate.join("pubspec.yaml").is_file())
        .unwrap_or(dir)
        .to_path_buf()
}

fn load_config(cli: &Cli, anchor: &Path) -> Result<Config, DataClassError> {
    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    let root = cli.project.clone().unwrap_or_else(|| find_project_root(anchor));
    let project = ProjectInfo::probe(&root)?;
    debug!(root = %root.display(), ?project, "loaded configuration");
    Ok(Config::new(settings, project))
}

fn report(outcome: Outcome) {
    debug!(?outcome, "command finished");
    if outcome == Outcome::Unchanged {
        println!("Nothing to do.");
    }
}

fn main() -> Result<(), DataClassError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate { input, part, yes, stdout } => {
            let config = load_config(&cli, input)?;
            let mut host = TerminalHost::open(input, *yes)?.with_stdout(*stdout);
            let outcome = generate_members(&mut host, &config, *part)?;
            host.finish()?;
            report(outcome);
            Ok(())
        }

        Commands::FromJson { input, name, output, yes } => {
            let output = output.clone().unwrap_or_else(|| input.with_extension("dart"));
            let config = load_config(&cli, &output)?;
            let mut host = TerminalHost::open_into(input, &output, *yes)?.with_class_name(name.clone());
            let outcome = generate_json_data_class(&mut host, &config)?;
            host.finish()?;
            report(outcome);
            Ok(())
        }

        Commands::SortImports { input, stdout } => {
            let config = load_config(&cli, input)?;
            let mut host = TerminalHost::open(input, true)?.with_stdout(*stdout);
            match sort_imports(&host.text(), &config.project) {
                Some(edit) => host.apply_edits(&[edit])?,
                None => report(Outcome::Unchanged),
            }
            host.finish()
        }

        Commands::Actions { input, line, apply } => {
            let config = load_config(&cli, input)?;
            let mut host = TerminalHost::open(input, true)?;
            let actions = code_actions(&host.text(), *line, &config);

            match apply {
                None => {
                    if actions.is_empty() {
                        println!("No quick fixes on line {}.", line);
                    }
                    for action in &actions {
                        println!("{}", action.title);
                    }
                    Ok(())
                }
                Some(title) => match actions.iter().find(|a| &a.title == title) {
                    Some(action) => {
                        host.apply_edits(&action.edits)?;
                        host.finish()
                    }
                    None => {
                        host.error(&format!("No quick fix named \"{}\" on line {}", title, line));
                        Ok(())
                    }
                },
            }
        }

        Commands::ParsingUtils { output } => {
            if let Some(out_path) = output {
                fs::write(out_path, PARSING_UTILS).map_err(|source| DataClassError::WriteFailed {
                    path: out_path.clone(),
                    source,
                })?;
                println!("ParsingUtils written to {}", out_path.display());
            } else {
                print!("{}", PARSING_UTILS);
            }
            Ok(())
        }
    }
}

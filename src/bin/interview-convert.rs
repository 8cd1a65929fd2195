//! interview-convert - interview definitions to questionnaire YAML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use interview_converter::{ConversionOptions, ConversionOutput, InterviewConverter};

/// Exit status for input that is neither a guide file nor a library directory
const EXIT_UNRECOGNIZED: u8 = 5;

/// Exit status under `--strict` when warnings were produced
const EXIT_WARNINGS: u8 = 4;

/// Guide files are recognised by this file name suffix
const WIZARD_SUFFIX: &str = "Guide.xml";

#[derive(Parser)]
#[command(name = "interview-convert")]
#[command(version, about = "Convert interview definitions to questionnaire YAML", long_about = None)]
#[command(after_help = "EXAMPLES:
    interview-convert Guide.xml            Convert a wizard guide
    interview-convert ./library/           Convert a component library directory
    interview-convert -v --strict lib/     Fail when anything was skipped")]
struct Cli {
    /// Wizard guide file (*Guide.xml) or component library directory
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File extension of component library files
    #[arg(long, value_name = "EXT", default_value = "cmp")]
    extension: String,

    /// Keep identical option lists separate
    #[arg(long)]
    no_dedupe: bool,

    /// Leave out computation placeholders
    #[arg(long)]
    no_computations: bool,

    /// Leave out defaults for prompt-less true/false variables
    #[arg(long)]
    no_defaults: bool,

    /// Exit non-zero when any warning was produced
    #[arg(long)]
    strict: bool,

    /// Log skipped items and progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

enum InputKind {
    Wizard,
    Library,
}

fn detect_input(path: &Path) -> Option<InputKind> {
    if path.to_string_lossy().ends_with(WIZARD_SUFFIX) {
        Some(InputKind::Wizard)
    } else if path.is_dir() {
        Some(InputKind::Library)
    } else {
        None
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "interview_converter=debug"
    } else {
        "interview_converter=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let converter = InterviewConverter::with_options(ConversionOptions {
        library_extension: cli.extension.trim_start_matches('.').to_string(),
        dedupe_choices: !cli.no_dedupe,
        include_computations: !cli.no_computations,
        include_boolean_defaults: !cli.no_defaults,
    });

    let output = match detect_input(&cli.input) {
        Some(InputKind::Wizard) => converter
            .load_wizard(&cli.input)
            .map(|interview| converter.convert(&interview)),
        Some(InputKind::Library) => converter
            .load_library(&cli.input)
            .map(|interview| converter.convert(&interview)),
        None => {
            eprintln!(
                "error: don't recognize the input type of {}",
                cli.input.display()
            );
            return ExitCode::from(EXIT_UNRECOGNIZED);
        }
    };

    match output {
        Ok(output) => finish(&output, cli.strict),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.code())
        }
    }
}

fn finish(output: &ConversionOutput, strict: bool) -> ExitCode {
    print!("{}", output.yaml);

    if strict && output.has_diagnostics() {
        eprintln!(
            "error: {} warning(s) produced in strict mode",
            output.diagnostics.len()
        );
        return ExitCode::from(EXIT_WARNINGS);
    }
    ExitCode::SUCCESS
}

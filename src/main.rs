use clap::Parser;
use colored::Colorize;
use std::{fs, path::PathBuf, process};
use tracing_subscriber::EnvFilter;
use uasm::{preprocess, Directive, ErrorPolicy, MatchMode, Options, ProcessedLine};

#[derive(Parser, Debug)]
#[command(name = "uasm")]
#[command(about = "Scan Beta assembly source and report its directives")]
struct Args {
    /// Source file to scan.
    source: PathBuf,
    /// Only accept a directive at the very start of a line.
    #[arg(long = "line-start", action = clap::ArgAction::SetTrue)]
    line_start: bool,
    /// Report every malformed line instead of stopping at the first one.
    #[arg(long = "keep-going", action = clap::ArgAction::SetTrue)]
    keep_going: bool,
    /// Print one JSON object per directive line.
    #[arg(long = "json", action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl Args {
    fn options(&self) -> Options {
        let mut options = Options::default();
        if self.line_start {
            options = options.with_match_mode(MatchMode::LineStart);
        }
        if self.keep_going {
            options = options.with_error_policy(ErrorPolicy::Collect);
        }
        options
    }
}

fn describe(directive: &Directive) -> String {
    match directive {
        Directive::NoDirective => String::new(),
        Directive::Include { .. } => "INCLUDE".to_string(),
        Directive::Align { value } => format!("ALIGN {}", value),
        Directive::Ascii { .. } => "ASCII".to_string(),
        Directive::Text { .. } => "TEXT".to_string(),
        Directive::Macro { definition } => {
            format!("MACRO {}({})", definition.name, definition.params.join(", "))
        },
    }
}

fn report(line: &ProcessedLine, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string(line)?);
    } else {
        println!("{}", line.text.yellow());
        println!("{}", describe(&line.directive));
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let src = match fs::read_to_string(&args.source) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("{} cannot read {}: {}", "error:".red().bold(), args.source.display(), err);
            process::exit(1);
        }
    };

    let preprocessed = match preprocess(&src, &args.options()) {
        Ok(preprocessed) => preprocessed,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            process::exit(1);
        }
    };

    for line in preprocessed.directives() {
        if let Err(err) = report(line, args.json) {
            eprintln!("{} {}", "error:".red().bold(), err);
            process::exit(1);
        }
    }
    for err in &preprocessed.errors {
        eprintln!("{} {}", "error:".red().bold(), err);
    }
    if !preprocessed.errors.is_empty() {
        process::exit(1);
    }
}

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gravel_ast::build_ast;
use gravel_config::GravelConfig;
use gravel_syntax::PredictionCache;

mod output;

use output::{render_errors, render_outline, render_tokens, token_entries, ParseReport};

#[derive(Parser)]
#[command(name = "gravel", version, about = "Groovy front-end: parse files into a positioned AST")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the AST of a single file and print it or its errors
    Parse(ParseArgs),
    /// Print the JSON schema of `gravel.toml`
    ConfigSchema,
}

#[derive(Args)]
struct ParseArgs {
    /// File to parse
    file: PathBuf,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
    /// Config file (defaults to `gravel.toml` discovered in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also print the token stream
    #[arg(long)]
    tokens: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Parse(args) => parse(&args),
        Command::ConfigSchema => {
            let schema = serde_json::to_string_pretty(&gravel_config::json_schema())?;
            emit(&format!("{schema}\n"))?;
            Ok(0)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<GravelConfig> {
    match explicit {
        Some(path) => Ok(GravelConfig::load_from_path(path)?),
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            let (config, _) = gravel_config::load_for_dir(&cwd)?;
            Ok(config)
        }
    }
}

fn parse(args: &ParseArgs) -> Result<i32> {
    let config = load_config(args.config.as_deref())?;
    gravel_config::init_tracing(&config.logging);

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let source_name = args.file.display().to_string();

    let tokens = if args.tokens {
        // A lexical error is reported by the build below.
        gravel_syntax::lex(&text).ok()
    } else {
        None
    };
    let token_entries = tokens.as_deref().map(|tokens| token_entries(tokens, &text));

    let cache = PredictionCache::new();
    let result = build_ast(&source_name, &text, &config.parser.parse_options(), &cache);
    let (module, errors) = match &result {
        Ok(module) => (Some(module), &[][..]),
        Err(failed) => {
            tracing::debug!(target: "gravel.cli", file = %source_name, errors = failed.errors().len(), "parse failed");
            (None, failed.errors())
        }
    };
    let exit = if errors.is_empty() { 0 } else { 1 };

    let rendered = if args.json {
        let report = ParseReport {
            file: source_name,
            tokens: token_entries,
            module,
            errors,
        };
        format!("{}\n", serde_json::to_string_pretty(&report)?)
    } else {
        let mut rendered = String::new();
        if let Some(entries) = &token_entries {
            rendered.push_str(&render_tokens(entries));
        }
        if let Some(module) = module {
            rendered.push_str(&render_outline(module));
        }
        rendered.push_str(&render_errors(errors));
        rendered
    };
    emit(&rendered)?;
    Ok(exit)
}

/// Write to stdout. A reader that stops early (`gravel parse f | head`)
/// is not an error.
fn emit(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("failed to write output"),
    }
}

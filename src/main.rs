//! entityfmt CLI: convert between markup dialects and entity JSON.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use entityfmt::{Dialect, FormattedText};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: entityfmt parse <dialect> [FILE|-]
       entityfmt unparse <dialect> [FILE|-]
       entityfmt convert <from> <to> [FILE|-]

dialects: markdown (md), html, markdownv2 (md2)
parse prints {\"text\", \"entities\"} JSON; unparse reads it.
Set RUST_LOG (default: warn) to see repaired markup.";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid entity json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] entityfmt::Error),
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(msg)) => {
            eprintln!("entityfmt: {msg}\n\n{USAGE}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("entityfmt: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &[String]) -> Result<(), CliError> {
    let Some((command, rest)) = args.split_first() else {
        return Err(CliError::Usage("missing command".into()));
    };

    let output = match command.as_str() {
        "parse" => {
            let (dialect, file) = dialect_and_file(rest)?;
            let markup = read_input(file)?;
            let doc = entityfmt::parse(&markup, dialect);
            tracing::debug!(%dialect, entities = doc.entities.len(), "parsed");
            let mut json = serde_json::to_string_pretty(&doc)?;
            json.push('\n');
            json
        }
        "unparse" => {
            let (dialect, file) = dialect_and_file(rest)?;
            let doc: FormattedText = serde_json::from_str(&read_input(file)?)?;
            entityfmt::unparse(&doc.text, &doc.entities, dialect)?
        }
        "convert" => {
            let (from, to, file) = match rest {
                [from, to] => (from, to, None),
                [from, to, file] => (from, to, Some(file.as_str())),
                _ => return Err(CliError::Usage("convert takes <from> <to> [FILE|-]".into())),
            };
            let from: Dialect = from.parse()?;
            let to: Dialect = to.parse()?;
            let doc = entityfmt::parse(&read_input(file)?, from);
            entityfmt::unparse(&doc.text, &doc.entities, to)?
        }
        "help" | "-h" | "--help" => format!("{USAGE}\n"),
        other => return Err(CliError::Usage(format!("unknown command: {other}"))),
    };

    io::stdout().write_all(output.as_bytes())?;
    Ok(())
}

fn dialect_and_file(rest: &[String]) -> Result<(Dialect, Option<&str>), CliError> {
    let (dialect, file) = match rest {
        [dialect] => (dialect, None),
        [dialect, file] => (dialect, Some(file.as_str())),
        _ => return Err(CliError::Usage("expected <dialect> [FILE|-]".into())),
    };
    Ok((dialect.parse()?, file))
}

/// Read a file, or stdin for `-` or no argument.
fn read_input(file: Option<&str>) -> io::Result<String> {
    match file {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

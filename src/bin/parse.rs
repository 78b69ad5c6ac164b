use bstr::ByteSlice;
use clap::Parser;
use guayavita::ast_dump::dump_file;
use guayavita::parse;
use guayavita::pos::SourceLocator;
use std::panic::catch_unwind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
enum CommandError {
    #[error("I/O error")]
    Io(
        #[from]
        #[source]
        std::io::Error,
    ),
    #[error("JSON serialization error")]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    #[error("Detected one or more errors")]
    HasError,
}

fn main() -> Result<(), CommandError> {
    let cli = Cli::parse();
    let mut has_error = false;
    for path in &cli.files {
        let bytes = std::fs::read(path)?;
        let source = bytes.to_str_lossy();
        let filename = path.display().to_string();
        let result = catch_unwind(|| parse(filename.as_str(), &source));
        let (file, diagnostics) = match result {
            Ok(result) => result,
            Err(e) => {
                let msg = if let Some(&e) = e.downcast_ref::<&'static str>() {
                    e
                } else if let Some(e) = e.downcast_ref::<String>() {
                    &e[..]
                } else {
                    "Box<Any>"
                };
                has_error = true;
                eprintln!("{}: parser panicked: {}", filename, msg);
                continue;
            }
        };
        let locator = SourceLocator::new(&source);
        for diagnostic in &diagnostics {
            has_error = true;
            eprint!("{}", diagnostic.render_with(&source, &locator));
        }
        if cli.dump {
            println!("{}", dump_file(&file));
        }
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
    }
    if has_error {
        return Err(CommandError::HasError);
    }
    Ok(())
}

/// Parses Guayavita source files and reports syntax errors.
#[derive(Debug, Parser)]
struct Cli {
    files: Vec<PathBuf>,
    /// Print the syntax tree as an S-expression
    #[clap(long)]
    dump: bool,
    /// Print the syntax tree as JSON
    #[clap(long)]
    json: bool,
}

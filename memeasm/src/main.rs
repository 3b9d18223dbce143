use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Parser;
use log::{debug, LevelFilter};
use memeasm::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("{0}")]
    Compile(memeasm::Error),
    #[error("assembling failed: {0}")]
    Assemble(io::Error),
}

fn run(args: &Args) -> Result<(), DriverError> {
    let assembly = memeasm::compile(args).map_err(DriverError::Compile)?;
    debug!("assembly written to {}", assembly.display());

    if args.assembly {
        return Ok(());
    }

    assemble(&assembly, args).map_err(DriverError::Assemble)?;
    if !args.keep_asm {
        let _ = fs::remove_file(&assembly);
    }
    Ok(())
}

/// Hands the emitted assembly to gcc, which assembles and (for executables)
/// links it.
fn assemble(input: &Path, args: &Args) -> Result<(), io::Error> {
    let output = match &args.output {
        Some(path) => path.clone(),
        None => input.with_extension(if args.object_file { "o" } else { "" }),
    };

    let mut command = Command::new("gcc");
    command.arg(input).arg("-o").arg(&output);
    if args.object_file {
        command.arg("-c");
    }

    let status = command.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("gcc exited with {status}"),
        ))
    }
}

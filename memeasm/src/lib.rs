use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use commands::CommandStream;
use thiserror::Error;

pub mod args;
pub mod diagnostics;
pub mod parse;
pub mod semantics;
pub mod translate;

pub use args::Args;
pub use diagnostics::Diagnostics;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    Linux,
    Macos,
    Windows,
}

impl Target {
    /// The symbol an executable's entry function has to be called.
    pub const fn main_symbol(self) -> &'static str {
        match self {
            Self::Macos => "_main",
            Self::Linux | Self::Windows => "main",
        }
    }

    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompileMode {
    Executable,
    ObjectFile,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptimisationLevel {
    None,
    O1,
    O2,
    O3,
    Os,
    O42069,
}

/// Everything the analyzers and the translator need to see, threaded
/// explicitly instead of living in globals.
#[derive(Debug)]
pub struct CompileState {
    pub commands: CommandStream,
    pub mode: CompileMode,
    pub opt: OptimisationLevel,
    pub use_stabs: bool,
    pub target: Target,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0} error(s) generated")]
    Invalid(usize),
}

/// Compiles the source file named in `args` down to `<input>.S` and returns
/// that path. Semantic diagnostics have already been printed when this
/// returns [`Error::Invalid`].
pub fn compile(args: &Args) -> Result<PathBuf, Error> {
    let source = fs::read_to_string(&args.file)?;

    let mut diagnostics = Diagnostics::new();
    let stream = parse::parse(&source, &mut diagnostics, seed_from_clock());

    let mut state = CompileState {
        commands: stream,
        mode: if args.object_file {
            CompileMode::ObjectFile
        } else {
            CompileMode::Executable
        },
        opt: args.opt.level(),
        use_stabs: args.debug,
        target: args.target,
        diagnostics,
    };

    semantics::check(&mut state);
    let errors = state.diagnostics.error_count();
    if errors > 0 {
        return Err(Error::Invalid(errors));
    }

    let output = args.file.with_extension("S");
    let mut sink = io::BufWriter::new(fs::File::create(&output)?);
    translate::write_assembly(&state, &args.file, &timestamp(), &mut sink)?;
    sink.flush()?;
    Ok(output)
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |elapsed| elapsed.as_nanos() as u64)
}

/// Wall-clock timestamp for the assembly header, `asctime`-shaped. Formatted
/// here and handed to the translator as a plain string, which keeps
/// translation itself reproducible.
fn timestamp() -> String {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs());
    format_timestamp(seconds)
}

fn format_timestamp(unix_seconds: u64) -> String {
    const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let days = unix_seconds / 86_400;
    let second_of_day = unix_seconds % 86_400;
    let (year, month, day) = civil_from_days(days as i64);
    // The epoch fell on a Thursday.
    let weekday = ((days + 4) % 7) as usize;

    format!(
        "{} {} {:>2} {:02}:{:02}:{:02} {} UTC",
        WEEKDAYS[weekday],
        MONTHS[month - 1],
        day,
        second_of_day / 3600,
        second_of_day % 3600 / 60,
        second_of_day % 60,
        year
    )
}

fn civil_from_days(days_since_epoch: i64) -> (i64, usize, i64) {
    let z = days_since_epoch + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as usize;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_at_epoch() {
        assert_eq!(format_timestamp(0), "Thu Jan  1 00:00:00 1970 UTC");
    }

    #[test]
    fn timestamp_well_past_epoch() {
        // 2021-07-01 12:30:05 was a Thursday.
        assert_eq!(format_timestamp(1_625_142_605), "Thu Jul  1 12:30:05 2021 UTC");
    }
}

//! STABS directive emission. The type numbers are fixed by the format; the
//! label conventions (`.Ltext0`, `.Lcmd_<n>`, `.Lret_<name>`, `.LEOF`) are
//! what debuggers reading our output resolve against.

use std::env;
use std::io::{self, Write};
use std::path::Path;

pub const N_SO: u32 = 100;
pub const N_SLINE: u32 = 68;
pub const N_FUN: u32 = 36;
pub const N_LBRAC: u32 = 0xc0;
pub const N_RBRAC: u32 = 0xe0;

/// Whether the current command still needs its `.Lcmd_<n>` line label, or a
/// preceding ignorable command already emitted it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelState {
    NeedsLabel,
    PreEmitted,
}

/// The source-file record. Relative paths are anchored to the process's
/// working directory so the debugger can find the file.
pub fn write_file_info(out: &mut impl Write, input: &Path) -> io::Result<()> {
    if input.is_absolute() {
        writeln!(out, ".stabs \"{}\", {N_SO}, 0, 0, .Ltext0", input.display())
    } else {
        let cwd = env::current_dir()?;
        writeln!(
            out,
            ".stabs \"{}/{}\", {N_SO}, 0, 0, .Ltext0",
            cwd.display(),
            input.display()
        )
    }
}

pub fn write_line_label(out: &mut impl Write, line: usize) -> io::Result<()> {
    writeln!(out, "\t.Lcmd_{line}:")
}

pub fn write_line_info(out: &mut impl Write, line: usize) -> io::Result<()> {
    writeln!(out, "\t.stabn {N_SLINE}, 0, {line}, .Lcmd_{line}")
}

/// The function record plus its bracketing range records, anchored at the
/// function label and its `.Lret_` end label.
pub fn write_function_info(out: &mut impl Write, name: &str) -> io::Result<()> {
    writeln!(out, ".stabs \"{name}:F1\", {N_FUN}, 0, 0, {name}")?;
    writeln!(out, ".stabn {N_LBRAC}, 0, 0, {name}")?;
    writeln!(out, ".stabn {N_RBRAC}, 0, 0, .Lret_{name}")
}

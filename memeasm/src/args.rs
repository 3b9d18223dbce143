use crate::{OptimisationLevel, Target};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version)]
pub struct Args {
    /// Path to the source file we're compiling.
    pub file: PathBuf,
    /// Where to place the finished executable or object file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Compile to an object file instead of an executable
    #[arg(short = 'c')]
    pub object_file: bool,
    /// Emit STABS debug info into the assembly
    #[arg(short = 'g', long = "debug")]
    pub debug: bool,
    /// Stop after emitting assembly
    #[arg(short = 'S', long = "assembly")]
    pub assembly: bool,
    /// Don't delete the intermediate assembly
    #[arg(long = "keep-asm")]
    pub keep_asm: bool,
    /// Operating system we're targetting
    #[arg(long, value_enum, default_value_t = Target::host())]
    pub target: Target,
    #[command(flatten)]
    pub opt: OptFlags,
    /// Log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Optimisation levels (currently all counterproductive).
#[derive(clap::Args)]
pub struct OptFlags {
    /// Insert a nop after every command
    #[arg(long = "O1")]
    o1: bool,
    /// Push and pop rax after every command
    #[arg(long = "O2")]
    o2: bool,
    /// Save and restore xmm0 after every command
    #[arg(long = "O3")]
    o3: bool,
    /// Optimise for size. The output gets a half-gigabyte alignment
    #[arg(long = "Os")]
    os: bool,
    /// Optimise away everything except function prologues
    #[arg(long = "O42069")]
    o42069: bool,
}

impl OptFlags {
    /// The highest requested level wins when several are passed.
    pub fn level(&self) -> OptimisationLevel {
        if self.o42069 {
            OptimisationLevel::O42069
        } else if self.os {
            OptimisationLevel::Os
        } else if self.o3 {
            OptimisationLevel::O3
        } else if self.o2 {
            OptimisationLevel::O2
        } else if self.o1 {
            OptimisationLevel::O1
        } else {
            OptimisationLevel::None
        }
    }
}

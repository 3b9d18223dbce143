//! The single-character I/O helpers appended to every translation unit.
//! All three targets funnel one byte through `.LCharacter`, scratching in
//! `.Ltmp64`, and promise to clobber nothing architectural.

use std::io::{self, Write};

use crate::Target;

pub fn write_helpers(out: &mut impl Write, target: Target) -> io::Result<()> {
    match target {
        // write(2)/read(2); the BSD syscall numbers live in the 0x2000000
        // namespace but the calling shape is identical.
        Target::Linux => write_unix_helpers(out, "1", "0"),
        Target::Macos => write_unix_helpers(out, "0x2000004", "0x2000003"),
        Target::Windows => write_windows_helpers(out),
    }
}

fn write_unix_helpers(out: &mut impl Write, write_nr: &str, read_nr: &str) -> io::Result<()> {
    write!(
        out,
        "\n\nwritechar:\n\
         \tpush rcx\n\
         \tpush r11\n\
         \tpush rax\n\
         \tpush rdi\n\
         \tpush rsi\n\
         \tpush rdx\n\
         \tmov rdx, 1\n\
         \tlea rsi, [rip + .LCharacter]\n\
         \tmov rax, {write_nr}\n\
         \tsyscall\n\
         \tpop rdx\n\
         \tpop rsi\n\
         \tpop rdi\n\
         \tpop rax\n\
         \tpop r11\n\
         \tpop rcx\n\
         \tret\n"
    )?;
    write!(
        out,
        "\n\nreadchar:\n\
         \tpush rcx\n\
         \tpush r11\n\
         \tpush rax\n\
         \tpush rdi\n\
         \tpush rsi\n\
         \tpush rdx\n\
         \tmov rdx, 1\n\
         \tlea rsi, [rip + .LCharacter]\n\
         \tmov rdi, 0\n\
         \tmov rax, {read_nr}\n\
         \tsyscall\n\
         \tpop rdx\n\
         \tpop rsi\n\
         \tpop rdi\n\
         \tpop rax\n\
         \tpop r11\n\
         \tpop rcx\n\
         \tret\n"
    )
}

/// Microsoft x64 ABI: args in rcx, rdx, r8, r9, the fifth parameter in the
/// stack slot above the 32-byte shadow space.
fn write_windows_helpers(out: &mut impl Write) -> io::Result<()> {
    write!(
        out,
        "\n\nwritechar:\n\
         \tpush rcx\n\
         \tpush rax\n\
         \tpush rdx\n\
         \tpush r8\n\
         \tpush r9\n\
         \tsub rsp, 32\n\
         \tmov rcx, -11\n\
         \tcall GetStdHandle\n\
         \tmov rcx, rax\n\
         \tlea rdx, [rip + .LCharacter]\n\
         \tmov r8, 1\n\
         \tlea r9, [rip + .Ltmp64]\n\
         \tmov QWORD PTR [rsp + 32], 0\n\
         \tcall WriteFile\n\
         \tadd rsp, 32\n\
         \tpop r9\n\
         \tpop r8\n\
         \tpop rdx\n\
         \tpop rax\n\
         \tpop rcx\n\
         \tret\n"
    )?;
    write!(
        out,
        "\n\nreadchar:\n\
         \tpush rcx\n\
         \tpush rax\n\
         \tpush rdx\n\
         \tpush r8\n\
         \tpush r9\n\
         \tsub rsp, 32\n\
         \tmov rcx, -10\n\
         \tcall GetStdHandle\n\
         \tmov rcx, rax\n\
         \tlea rdx, [rip + .LCharacter]\n\
         \tmov r8, 1\n\
         \tlea r9, [rip + .Ltmp64]\n\
         \tmov QWORD PTR [rsp + 32], 0\n\
         \tcall ReadFile\n\
         \tadd rsp, 32\n\
         \tpop r9\n\
         \tpop r8\n\
         \tpop rdx\n\
         \tpop rax\n\
         \tpop rcx\n\
         \tret\n"
    )
}

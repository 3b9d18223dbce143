//! Translation of a validated command stream into GNU-Assembler Intel-syntax
//! text. No checking happens here; the analyzers have already signed the
//! stream off, and anything malformed at this point is an upstream bug.

mod runtime;
pub mod stabs;

use std::io::{self, Write};
use std::path::Path;

use commands::{CommandDef, ParsedCommand};
use log::trace;

use crate::{CompileState, OptimisationLevel, Target, VERSION};
use stabs::LabelState;

struct TranslatorState<'a> {
    /// Name of the function currently being emitted; the return label of
    /// the STABS range records is derived from it.
    current_function: &'a str,
    label: LabelState,
}

/// Writes the complete assembly translation of `state` to `out`. The
/// timestamp only ends up in the header comment, so callers that need
/// reproducible output pass a fixed one.
pub fn write_assembly(
    state: &CompileState,
    input: &Path,
    timestamp: &str,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        out,
        "#\n# Generated by the memeasm compiler {VERSION} on {timestamp}\n#"
    )?;
    writeln!(out, ".intel_syntax noprefix")?;

    for command in state.commands.iter() {
        if command.opcode.is_function_decl() && command.translate {
            writeln!(out, ".global {}", command.parameter(0).unwrap_or_default())?;
        }
    }

    if state.target == Target::Windows {
        writeln!(out, "\n.extern GetStdHandle\n.extern WriteFile\n.extern ReadFile")?;
    }

    match state.target {
        Target::Macos => write!(out, "\n.data\n\t")?,
        Target::Linux | Target::Windows => write!(out, "\n.section .data\n\t")?,
    }
    writeln!(
        out,
        ".LCharacter: .ascii \"a\"\n\t.Ltmp64: .byte 0, 0, 0, 0, 0, 0, 0, 0"
    )?;

    if state.use_stabs {
        stabs::write_file_info(out, input)?;
    }

    match state.target {
        Target::Macos => write!(out, "\n\n.text\n\t")?,
        Target::Linux | Target::Windows => write!(out, "\n\n.section .text\n")?,
    }
    writeln!(out, "\n\n.Ltext0:")?;

    let mut translator = TranslatorState {
        current_function: "",
        label: LabelState::NeedsLabel,
    };
    for (index, command) in state.commands.iter().enumerate() {
        // The label has to share the line with whatever command lands at
        // the random index, so no newline here.
        if index == state.commands.random_index() {
            write!(out, "\t.LConfusedStonks: ")?;
        }
        if command.translate {
            trace!("translating index {index} (line {})", command.line);
            translate_command(state, &mut translator, index, out)?;
        }
    }

    if state.opt != OptimisationLevel::O42069 {
        runtime::write_helpers(out, state.target)?;
    }

    if state.use_stabs {
        for command in state.commands.iter() {
            if command.opcode.is_function_decl() && command.translate {
                stabs::write_function_info(out, command.parameter(0).unwrap_or_default())?;
            }
        }
        writeln!(out, "\n.LEOF:")?;
        writeln!(out, ".stabs \"\", {}, 0, 0, .LEOF", stabs::N_SO)?;
    }

    if state.opt == OptimisationLevel::Os {
        writeln!(out, ".align 536870912")?;
    }

    Ok(())
}

fn translate_command<'a>(
    state: &'a CompileState,
    translator: &mut TranslatorState<'a>,
    index: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let command = &state.commands[index];

    // The ultimate optimisation: nothing but function prologues survives.
    if state.opt == OptimisationLevel::O42069 && !command.opcode.is_function_decl() {
        return Ok(());
    }

    if state.use_stabs {
        if command.opcode.is_function_decl() {
            translator.current_function = command.parameter(0).unwrap_or_default();
        } else if command.opcode.is_ignorable() {
            // Emit the next command's line label ahead of time so the
            // breakpoint and its successor share one debugger location.
            if let Some(next) = state.commands.get(index + 1) {
                stabs::write_line_label(out, next.line)?;
            }
            translator.label = LabelState::PreEmitted;
        } else if translator.label == LabelState::PreEmitted {
            translator.label = LabelState::NeedsLabel;
        } else {
            stabs::write_line_label(out, command.line)?;
        }
    }

    let translated = expand_template(command.opcode.def(), command);
    if !command.opcode.is_function_decl() {
        out.write_all(b"\t")?;
    }
    out.write_all(translated.as_bytes())?;
    writeln!(out)?;

    match state.opt {
        OptimisationLevel::O1 => writeln!(out, "\tnop")?,
        OptimisationLevel::O2 => writeln!(out, "\tpush rax\n\tpop rax")?,
        OptimisationLevel::O3 => {
            writeln!(out, "\tmovups [rsp + 8], xmm0\n\tmovups xmm0, [rsp + 8]")?
        }
        // Only reachable for a function declaration; close it right away.
        OptimisationLevel::O42069 => writeln!(out, "\txor rax, rax\n\tret")?,
        OptimisationLevel::None | OptimisationLevel::Os => {}
    }

    if state.use_stabs && !command.opcode.is_function_decl() {
        let closes_function = command.opcode.is_return()
            && state
                .commands
                .get(index + 1)
                .map_or(true, |next| next.opcode.is_function_decl());
        if closes_function {
            writeln!(out, "\t.Lret_{}:", translator.current_function)?;
        }
        if !command.opcode.is_ignorable() {
            stabs::write_line_info(out, command.line)?;
        }
    }

    Ok(())
}

/// Substitutes the command's parameters into its translation template.
/// Digits below the parameter count are capture slots; a parameter marked
/// as memory-indirect gets wrapped in brackets.
fn expand_template(def: &CommandDef, command: &ParsedCommand) -> String {
    let mut translated = String::with_capacity(def.translation.len());
    for character in def.translation.chars() {
        match character.to_digit(10) {
            Some(slot) if (slot as u8) < def.used_parameters => {
                let slot = slot as usize;
                let parameter = command.parameter(slot).unwrap_or_default();
                if command.is_pointer == slot as u8 + 1 {
                    translated.push('[');
                    translated.push_str(parameter);
                    translated.push(']');
                } else {
                    translated.push_str(parameter);
                }
            }
            _ => translated.push(character),
        }
    }
    translated
}

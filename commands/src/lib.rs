//! Shared data model: the parsed command stream and the opcode vocabulary.

mod table;

pub use table::{param, CommandDef, COMMAND_LIST};

use std::ops::Deref;

pub const NUMBER_OF_COMMANDS: usize = 38;
pub const MAX_PARAMETER_COUNT: usize = 2;

/// A line-comment in source starts with this phrase.
pub const COMMENT_PREFIX: &str = "What the hell happened here?";
pub const OR_DRAW_25_SUFFIX: &str = "or draw 25";
pub const POINTER_SUFFIX: &str = "do you know de wey";

/// Index into [`COMMAND_LIST`].
///
/// Families of related commands occupy consecutive opcodes; that layout is an
/// artifact of the parser boundary and is confined to [`Opcode::family`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opcode(pub u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Family {
    FunctionDecl,
    Return,
    Compare(ComparisonFamily),
    CompareLabel(ComparisonFamily),
    Plain,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparisonFamily {
    WhoWouldWin,
    SamePicture,
}

impl Opcode {
    pub const FUNCTION_DECLARATION: Opcode = Opcode(0);
    pub const WHO_WOULD_WIN: Opcode = Opcode(22);
    pub const WHO_WINS_MARKER: Opcode = Opcode(23);
    pub const SAME_PICTURE_COMPARE: Opcode = Opcode(24);
    pub const SAME_PICTURE_MARKER: Opcode = Opcode(25);
    pub const PERFECTLY_BALANCED: Opcode = Opcode(28);
    pub const OR_DRAW_25: Opcode = Opcode(NUMBER_OF_COMMANDS as u8 - 2);
    pub const INVALID_COMMAND: Opcode = Opcode(NUMBER_OF_COMMANDS as u8 - 1);

    pub const fn family(self) -> Family {
        match self {
            Self::FUNCTION_DECLARATION => Family::FunctionDecl,
            Opcode(1..=3) => Family::Return,
            Self::WHO_WOULD_WIN => Family::Compare(ComparisonFamily::WhoWouldWin),
            Self::WHO_WINS_MARKER => Family::CompareLabel(ComparisonFamily::WhoWouldWin),
            Self::SAME_PICTURE_COMPARE => Family::Compare(ComparisonFamily::SamePicture),
            Self::SAME_PICTURE_MARKER => Family::CompareLabel(ComparisonFamily::SamePicture),
            _ => Family::Plain,
        }
    }

    pub const fn is_function_decl(self) -> bool {
        matches!(self.family(), Family::FunctionDecl)
    }

    pub const fn is_return(self) -> bool {
        matches!(self.family(), Family::Return)
    }

    pub fn def(self) -> &'static CommandDef {
        &COMMAND_LIST[self.0 as usize]
    }

    /// Commands whose translation is exactly `int3` carry no debug line info
    /// of their own; the debugger already stops on them.
    pub fn is_ignorable(self) -> bool {
        self.def().translation == "int3"
    }
}

/// One parsed source statement.
#[derive(Clone, Debug)]
pub struct ParsedCommand {
    pub opcode: Opcode,
    pub parameters: [Option<String>; MAX_PARAMETER_COUNT],
    /// 0 = no pointer operand, 1 = first parameter is memory-indirect, 2 = second.
    pub is_pointer: u8,
    pub line: usize,
    /// Cleared by the "perfectly balanced" pass; the translator skips
    /// commands with this unset and asks no further questions.
    pub translate: bool,
}

impl ParsedCommand {
    pub fn new(opcode: Opcode, line: usize) -> Self {
        Self {
            opcode,
            parameters: [None, None],
            is_pointer: 0,
            line,
            translate: true,
        }
    }

    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index)?.as_deref()
    }
}

/// The ordered command stream plus the auxiliary cursor used by
/// "confused stonks" (the index that receives the `.LConfusedStonks` label).
#[derive(Debug)]
pub struct CommandStream {
    commands: Box<[ParsedCommand]>,
    random_index: usize,
}

impl CommandStream {
    pub fn new(commands: Vec<ParsedCommand>, random_index: usize) -> Self {
        Self {
            commands: commands.into(),
            random_index,
        }
    }

    pub const fn random_index(&self) -> usize {
        self.random_index
    }
}

impl Deref for CommandStream {
    type Target = [ParsedCommand];

    fn deref(&self) -> &Self::Target {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_layout() {
        assert_eq!(Opcode(0).family(), Family::FunctionDecl);
        for raw in 1..=3 {
            assert_eq!(Opcode(raw).family(), Family::Return);
        }
        assert_eq!(
            Opcode::WHO_WINS_MARKER.0,
            Opcode::WHO_WOULD_WIN.0 + 1,
            "marker opcode must follow its comparison"
        );
        assert_eq!(Opcode::SAME_PICTURE_MARKER.0, Opcode::SAME_PICTURE_COMPARE.0 + 1);
    }

    #[test]
    fn breakpoint_is_the_only_ignorable_command() {
        let ignorable: Vec<u8> = (0..NUMBER_OF_COMMANDS as u8)
            .filter(|&raw| Opcode(raw).is_ignorable())
            .collect();
        assert_eq!(ignorable.len(), 1);
        assert_eq!(COMMAND_LIST[ignorable[0] as usize].pattern, "it's a trap");
    }
}

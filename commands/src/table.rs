//! The static command table. Indexed by opcode; consumed by the parser
//! (patterns, parameter masks) and the translator (templates).

use crate::MAX_PARAMETER_COUNT;

/// Allowed-parameter-type bits. A parameter slot accepts a token if the
/// token's classification intersects the slot's mask.
pub mod param {
    pub const REG64: u8 = 1;
    pub const REG32: u8 = 2;
    pub const REG16: u8 = 4;
    pub const REG8: u8 = 8;
    pub const DECIMAL: u8 = 16;
    pub const CHAR: u8 = 32;
    pub const MONKE_LABEL: u8 = 64;
    pub const FUNC_NAME: u8 = 128;

    pub const ANY_REG: u8 = REG64 | REG32 | REG16 | REG8;
    pub const ANY_VALUE: u8 = ANY_REG | DECIMAL | CHAR;
}

use param::*;

pub struct CommandDef {
    /// Surface phrase, whitespace-tokenized; the digits `0` and `1` mark
    /// parameter capture slots.
    pub pattern: &'static str,
    pub used_parameters: u8,
    pub allowed_param_types: [u8; MAX_PARAMETER_COUNT],
    /// Assembly template. Digits below `used_parameters` substitute the
    /// corresponding parameter; everything else is emitted verbatim.
    pub translation: &'static str,
}

const fn def(
    pattern: &'static str,
    used_parameters: u8,
    allowed_param_types: [u8; MAX_PARAMETER_COUNT],
    translation: &'static str,
) -> CommandDef {
    CommandDef {
        pattern,
        used_parameters,
        allowed_param_types,
        translation,
    }
}

pub static COMMAND_LIST: [CommandDef; crate::NUMBER_OF_COMMANDS] = [
    // Functions. The three returns must stay on the opcodes directly after
    // the declaration.
    def("my name is 0", 1, [FUNC_NAME, 0], "0:"),
    def("right back at ya, buckaroo", 0, [0, 0], "ret"),
    def("I see this as an absolute win", 0, [0, 0], "xor rax, rax\n\tret"),
    def("no, I don't think I will", 0, [0, 0], "mov rax, 1\n\tret"),
    def("whomst has summoned the almighty 0", 1, [FUNC_NAME, 0], "call 0"),
    // Stack
    def("stonks 0", 1, [REG64 | DECIMAL | CHAR, 0], "push 0"),
    def("not stonks 0", 1, [REG64, 0], "pop 0"),
    // Arithmetic
    def("upvote 0", 1, [ANY_REG, 0], "add 0, 1"),
    def("downvote 0", 1, [ANY_REG, 0], "sub 0, 1"),
    def("parry 0 you filthy casual 1", 2, [ANY_VALUE, ANY_REG], "sub 1, 0"),
    def(
        "0 units are ready, with 1 more well on the way",
        2,
        [ANY_REG, ANY_VALUE],
        "add 0, 1",
    ),
    def("upgrades, people. Upgrades 0", 1, [ANY_REG, 0], "shl 0, 1"),
    def(
        "they had us in the first half, not gonna lie 0",
        1,
        [ANY_REG, 0],
        "shr 0, 1",
    ),
    def(
        "0 is getting out of hand, now there are 1 of them",
        2,
        [ANY_REG, REG64 | DECIMAL],
        "imul 0, 1",
    ),
    def("bitconneeeeeeect 0 1", 2, [ANY_REG, ANY_VALUE], "and 0, 1"),
    def("sneak 100 0", 1, [ANY_REG, 0], "xor 0, 0"),
    def("0 is great, but I want 1", 2, [ANY_REG, ANY_VALUE], "mov 0, 1"),
    def("guess I'll die", 0, [0, 0], "mov rax, [69]"),
    // Jump markers
    def("upgrade", 0, [0, 0], ".LUpgradeMarker:"),
    def("fuck go back", 0, [0, 0], "jmp .LUpgradeMarker"),
    def("monke 0", 1, [MONKE_LABEL, 0], ".L0:"),
    def("return to monke 0", 1, [MONKE_LABEL, 0], "jmp .L0"),
    // Comparisons; each marker opcode must directly follow its comparison.
    def(
        "who would win? 0 or 1",
        2,
        [ANY_VALUE, ANY_VALUE],
        "cmp 0, 1\n\tjg .L0Wins\n\tjl .L1Wins",
    ),
    def("0 wins", 1, [ANY_VALUE, 0], ".L0Wins:"),
    def(
        "corporate needs you to find the difference between 0 and 1",
        2,
        [ANY_VALUE, ANY_VALUE],
        "cmp 0, 1\n\tje .LSamePicture",
    ),
    def("they're the same picture", 0, [0, 0], ".LSamePicture:"),
    def("ah shit, here we go again", 0, [0, 0], "jmp .Ltext0"),
    def("confused stonks", 0, [0, 0], "jmp .LConfusedStonks"),
    // Parse-time directive; disabled before translation ever sees it.
    def("perfectly balanced as all things should be", 0, [0, 0], ""),
    // I/O
    def(
        "what can I say except 0",
        1,
        [CHAR | REG8 | DECIMAL, 0],
        "mov byte ptr [rip + .LCharacter], 0\n\tcall writechar",
    ),
    def(
        "let me in. LET ME IIIIIN 0",
        1,
        [REG8, 0],
        "call readchar\n\tmov 0, byte ptr [rip + .LCharacter]",
    ),
    // Debugging and misc
    def("it's a trap", 0, [0, 0], "int3"),
    def("oh no! anyway", 0, [0, 0], "nop"),
    def("you shall not pass!", 0, [0, 0], "jmp ."),
    def(
        "it's dangerous to go alone, take 0",
        1,
        [REG64, 0],
        "lea 0, [rip + .LCharacter]",
    ),
    def("Houston, we have a problem", 0, [0, 0], "ud2"),
    // Sentinels: "or draw 25" replaces any command it is appended to, and
    // the invalid slot marks lines that matched nothing.
    def("or draw 25", 0, [0, 0], "add eax, 25"),
    def("", 0, [0, 0], ""),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Opcode, NUMBER_OF_COMMANDS};

    #[test]
    fn table_is_fully_populated() {
        assert_eq!(COMMAND_LIST.len(), NUMBER_OF_COMMANDS);
        for (raw, def) in COMMAND_LIST.iter().enumerate() {
            assert!(def.used_parameters as usize <= MAX_PARAMETER_COUNT, "opcode {raw}");
        }
    }

    #[test]
    fn sentinels_sit_at_the_end() {
        assert_eq!(Opcode::OR_DRAW_25.def().pattern, "or draw 25");
        assert_eq!(Opcode::INVALID_COMMAND.def().pattern, "");
    }

    #[test]
    fn templates_substitute_every_declared_parameter() {
        // Digits below the parameter count are capture slots, so each
        // declared parameter must actually appear somewhere in the template
        // (the only exception being pattern-only sentinels).
        for (raw, def) in COMMAND_LIST.iter().enumerate() {
            for slot in 0..def.used_parameters {
                let placeholder = char::from(b'0' + slot);
                assert!(
                    def.translation.contains(placeholder),
                    "opcode {raw} never substitutes parameter {slot}"
                );
            }
        }
        // Spot-check the two-parameter comparison, whose jump labels embed
        // both placeholders.
        let who = Opcode::WHO_WOULD_WIN.def();
        assert_eq!(who.used_parameters, 2);
        assert!(who.translation.contains(".L0Wins"));
        assert!(who.translation.contains(".L1Wins"));
    }
}

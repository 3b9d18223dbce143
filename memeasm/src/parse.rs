//! Turns source text into the command stream. Every non-empty, non-comment
//! line has to match exactly one command pattern; the magic suffixes
//! ("or draw 25", "do you know de wey") are peeled off first.

use commands::{
    param, CommandStream, Opcode, ParsedCommand, COMMENT_PREFIX, MAX_PARAMETER_COUNT,
    NUMBER_OF_COMMANDS, OR_DRAW_25_SUFFIX, POINTER_SUFFIX,
};
use log::debug;

use crate::diagnostics::Diagnostics;

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Line does not match any known command")]
    UnknownCommand,
    #[error("Parameter \"{0}\" is not allowed here")]
    InvalidParameter(String),
    #[error("\"or draw 25\" has to follow an otherwise valid command")]
    DanglingOrDraw25,
    #[error("\"do you know de wey\" requires a 64-bit register parameter")]
    PointerWithoutRegister,
}

/// Parses the whole source into a command stream. Syntax errors are recorded
/// and the offending line is kept as an invalid-command placeholder so the
/// analyzers still see the surrounding structure.
pub fn parse(source: &str, diagnostics: &mut Diagnostics, seed: u64) -> CommandStream {
    let mut rng = XorShift::new(seed);
    let mut parsed = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_num = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        match parse_line(line, line_num) {
            Ok(command) => parsed.push(command),
            Err(error) => {
                diagnostics.error(error, line_num);
                parsed.push(ParsedCommand::new(Opcode::INVALID_COMMAND, line_num));
            }
        }
    }
    debug!("parsed {} command(s)", parsed.len());

    balance(&mut parsed, &mut rng);

    let random_index = if parsed.is_empty() {
        0
    } else {
        rng.next() as usize % parsed.len()
    };
    CommandStream::new(parsed, random_index)
}

fn parse_line(line: &str, line_num: usize) -> Result<ParsedCommand, SyntaxError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    // "<command> or draw 25": the command has to be valid, and is then
    // dropped wholesale in favour of the sentinel.
    if let Some(prefix_len) = ends_with_phrase(&tokens, OR_DRAW_25_SUFFIX) {
        if prefix_len > 0 && parse_command(&tokens[..prefix_len], line_num).is_ok() {
            return Ok(ParsedCommand::new(Opcode::OR_DRAW_25, line_num));
        }
        return Err(SyntaxError::DanglingOrDraw25);
    }

    parse_command(&tokens, line_num)
}

fn parse_command(tokens: &[&str], line_num: usize) -> Result<ParsedCommand, SyntaxError> {
    let mut wants_pointer = false;
    let tokens = match ends_with_phrase(tokens, POINTER_SUFFIX) {
        Some(prefix_len) => {
            wants_pointer = true;
            &tokens[..prefix_len]
        }
        None => tokens,
    };

    let (opcode, captured) = find_match(tokens).ok_or(SyntaxError::UnknownCommand)?;
    let def = opcode.def();

    let mut command = ParsedCommand::new(opcode, line_num);
    for slot in 0..def.used_parameters as usize {
        let token = captured[slot].unwrap_or_default();
        let mask = classify(token);
        let allowed = def.allowed_param_types[slot];
        if mask & allowed == 0 {
            return Err(SyntaxError::InvalidParameter(token.to_string()));
        }
        command.parameters[slot] = Some(lower(token, mask, allowed));
    }

    if wants_pointer {
        let register_slot = (0..def.used_parameters as usize).find(|&slot| {
            captured[slot].map_or(false, |token| classify(token) & param::REG64 != 0)
        });
        match register_slot {
            Some(slot) => command.is_pointer = slot as u8 + 1,
            None => return Err(SyntaxError::PointerWithoutRegister),
        }
    }

    Ok(command)
}

/// Matches the token list against every regular command pattern (the two
/// sentinels never match source directly). Pattern digits capture the token
/// in their position; every other pattern word has to match verbatim.
fn find_match<'a>(tokens: &[&'a str]) -> Option<(Opcode, [Option<&'a str>; MAX_PARAMETER_COUNT])> {
    'patterns: for (raw, def) in commands::COMMAND_LIST
        .iter()
        .enumerate()
        .take(NUMBER_OF_COMMANDS - 2)
    {
        let pattern = def.pattern.split_whitespace();
        if pattern.clone().count() != tokens.len() {
            continue;
        }
        let mut captured = [None, None];
        for (expected, &token) in pattern.zip(tokens) {
            match expected {
                "0" => captured[0] = Some(token),
                "1" => captured[1] = Some(token),
                word if word == token => {}
                _ => continue 'patterns,
            }
        }
        return Some((Opcode(raw as u8), captured));
    }
    None
}

fn ends_with_phrase(tokens: &[&str], phrase: &str) -> Option<usize> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    let prefix_len = tokens.len().checked_sub(words.len())?;
    (tokens[prefix_len..] == words[..]).then_some(prefix_len)
}

const REG64_NAMES: [&str; 16] = [
    "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rbp", "rsp", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];
const REG32_NAMES: [&str; 16] = [
    "eax", "ebx", "ecx", "edx", "esi", "edi", "ebp", "esp", "r8d", "r9d", "r10d", "r11d", "r12d",
    "r13d", "r14d", "r15d",
];
const REG16_NAMES: [&str; 16] = [
    "ax", "bx", "cx", "dx", "si", "di", "bp", "sp", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w",
    "r14w", "r15w",
];
const REG8_NAMES: [&str; 20] = [
    "al", "bl", "cl", "dl", "ah", "bh", "ch", "dh", "sil", "dil", "bpl", "spl", "r8b", "r9b",
    "r10b", "r11b", "r12b", "r13b", "r14b", "r15b",
];

/// Every reading a token admits, as a bitmask over [`param`] types. A slot
/// accepts the token if the mask intersects its allowed set.
fn classify(token: &str) -> u8 {
    let mut mask = 0;
    if REG64_NAMES.contains(&token) {
        mask |= param::REG64;
    }
    if REG32_NAMES.contains(&token) {
        mask |= param::REG32;
    }
    if REG16_NAMES.contains(&token) {
        mask |= param::REG16;
    }
    if REG8_NAMES.contains(&token) {
        mask |= param::REG8;
    }
    if is_decimal(token) {
        mask |= param::DECIMAL;
    }
    if char_code(token).is_some() {
        mask |= param::CHAR;
    }
    if is_monke_label(token) {
        mask |= param::MONKE_LABEL;
    }
    if is_function_name(token) {
        mask |= param::FUNC_NAME;
    }
    mask
}

/// Characters reach the assembly as their ASCII code; everything else
/// passes through verbatim. The character reading only applies when no
/// other accepted reading fits, so `5` stays the number five.
fn lower(token: &str, mask: u8, allowed: u8) -> String {
    if mask & allowed == param::CHAR {
        if let Some(code) = char_code(token) {
            return code.to_string();
        }
    }
    token.to_string()
}

fn char_code(token: &str) -> Option<u8> {
    let mut chars = token.chars();
    match (chars.next()?, chars.next(), chars.next()) {
        (c, None, None) if c.is_ascii() && !c.is_ascii_control() => Some(c as u8),
        ('\\', Some(escape), None) => match escape {
            'n' => Some(b'\n'),
            't' => Some(b'\t'),
            'r' => Some(b'\r'),
            '0' => Some(0),
            // A space cannot survive tokenization, so it gets an escape.
            's' => Some(b' '),
            '\\' => Some(b'\\'),
            _ => None,
        },
        _ => None,
    }
}

fn is_decimal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Monke jump labels are spelled entirely in `a` and `u` and need at least
/// one of each.
fn is_monke_label(token: &str) -> bool {
    token.bytes().all(|byte| matches!(byte, b'a' | b'u'))
        && token.contains('a')
        && token.contains('u')
}

fn is_function_name(token: &str) -> bool {
    let mut chars = token.chars();
    chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The "perfectly balanced" pass: each occurrence disables itself and half
/// of the commands still enabled for translation.
fn balance(parsed: &mut [ParsedCommand], rng: &mut XorShift) {
    for index in 0..parsed.len() {
        if parsed[index].opcode != Opcode::PERFECTLY_BALANCED || !parsed[index].translate {
            continue;
        }
        parsed[index].translate = false;

        let mut enabled: Vec<usize> = parsed
            .iter()
            .enumerate()
            .filter(|(_, command)| command.translate)
            .map(|(position, _)| position)
            .collect();
        let half = enabled.len() / 2;
        for _ in 0..half {
            let pick = rng.next() as usize % enabled.len();
            let victim = enabled.swap_remove(pick);
            parsed[victim].translate = false;
        }
        debug!("perfectly balanced: snapped {half} command(s)");
    }
}

/// xorshift64. The corpus-free stand-in for a randomness crate; quality
/// does not matter here, but a fixed seed keeping tests deterministic does.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

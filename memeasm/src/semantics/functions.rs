//! Function-structure analysis: every command has to live inside a function,
//! every function has to end in a return, names are unique, and executables
//! need an entry function.

use commands::CommandStream;
use log::debug;

use super::SemanticError;
use crate::diagnostics::Diagnostics;
use crate::{CompileMode, Target};

struct Function<'a> {
    name: &'a str,
    defined_in_line: usize,
    /// Body commands following the declaration, up to and including the
    /// last return seen before the next declaration or the end of the
    /// stream.
    number_of_commands: usize,
}

pub fn check(
    commands: &CommandStream,
    mode: CompileMode,
    target: Target,
    diagnostics: &mut Diagnostics,
) {
    let declarations = commands
        .iter()
        .filter(|command| command.opcode.is_function_decl())
        .count();
    debug!("function check: {declarations} declaration(s) in the stream");

    let mut functions: Vec<Function> = Vec::with_capacity(declarations);

    let mut index = 0;
    while index < commands.len() {
        // Between functions; only declarations are legal here.
        while index < commands.len() && !commands[index].opcode.is_function_decl() {
            diagnostics.error(SemanticError::FloatingStatement, commands[index].line);
            index += 1;
        }
        if index >= commands.len() {
            break;
        }

        let function = parse_function(commands, index, diagnostics);
        index += function.number_of_commands + 1;
        functions.push(function);
    }

    for (position, function) in functions.iter().enumerate() {
        for later in &functions[position + 1..] {
            if function.name == later.name {
                diagnostics.error_with_extra(
                    SemanticError::DuplicateFunction,
                    later.defined_in_line,
                    function.defined_in_line,
                );
            }
        }
    }

    if mode == CompileMode::Executable
        && !functions
            .iter()
            .any(|function| function.name == target.main_symbol())
    {
        diagnostics.error(SemanticError::MainMissing, 1);
    }
}

/// Walks the body starting at the declaration at `start`. The body extends
/// to the last return before the next declaration; commands between two
/// returns are dead code but still belong to the function.
fn parse_function<'a>(
    commands: &'a CommandStream,
    start: usize,
    diagnostics: &mut Diagnostics,
) -> Function<'a> {
    let declaration = &commands[start];
    debug!(
        "parsing function {:?} at line {}",
        declaration.parameter(0),
        declaration.line
    );

    let mut index = 1;
    let mut last_return = None;
    let mut interrupted = false;
    while start + index < commands.len() {
        let command = &commands[start + index];
        if command.opcode.is_function_decl() {
            if last_return.is_none() {
                diagnostics.error(SemanticError::ReturnExpected, command.line);
                interrupted = true;
            }
            break;
        }
        if command.opcode.is_return() {
            last_return = Some(index);
        }
        index += 1;
    }

    if last_return.is_none() {
        diagnostics.error(SemanticError::NoReturn, declaration.line);
    }
    let number_of_commands = match last_return {
        Some(position) => position,
        // A new declaration closes the body early; everything scanned so
        // far (except that declaration) counts as the body.
        None if interrupted => index - 1,
        None => 0,
    };

    Function {
        name: declaration.parameter(0).unwrap_or_default(),
        defined_in_line: declaration.line,
        number_of_commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::{Opcode, ParsedCommand};

    fn decl(name: &str, line: usize) -> ParsedCommand {
        let mut command = ParsedCommand::new(Opcode::FUNCTION_DECLARATION, line);
        command.parameters[0] = Some(name.into());
        command
    }

    fn ret(line: usize) -> ParsedCommand {
        ParsedCommand::new(Opcode(1), line)
    }

    fn plain(line: usize) -> ParsedCommand {
        // "guess I'll die"
        ParsedCommand::new(Opcode(17), line)
    }

    fn run(commands: Vec<ParsedCommand>, mode: CompileMode) -> Diagnostics {
        let stream = CommandStream::new(commands, 0);
        let mut diagnostics = Diagnostics::new();
        check(&stream, mode, Target::Linux, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn accepts_a_minimal_main() {
        let diagnostics = run(vec![decl("main", 1), ret(2)], CompileMode::Executable);
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn missing_main_is_reported_for_executables() {
        let diagnostics = run(vec![decl("foo", 1), ret(2)], CompileMode::Executable);
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].message,
            "An executable cannot be created if no main-function exists"
        );
        assert_eq!(recorded[0].line, 1);
    }

    #[test]
    fn object_files_need_no_main() {
        let diagnostics = run(vec![decl("foo", 1), ret(2)], CompileMode::ObjectFile);
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn duplicate_names_point_at_both_definitions() {
        let diagnostics = run(
            vec![decl("f", 1), ret(2), decl("f", 3), ret(4)],
            CompileMode::ObjectFile,
        );
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "Duplicate function definition");
        assert_eq!(recorded[0].line, 3);
        assert_eq!(recorded[0].extra_line, Some(1));
    }

    #[test]
    fn leading_statement_belongs_to_no_function() {
        let diagnostics = run(
            vec![plain(1), decl("main", 2), ret(3)],
            CompileMode::Executable,
        );
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "Statement does not belong to any function");
        assert_eq!(recorded[0].line, 1);
    }

    #[test]
    fn missing_return_is_reported_at_the_declaration() {
        let diagnostics = run(vec![decl("main", 1), plain(2)], CompileMode::Executable);
        let recorded = diagnostics.recorded();
        // The body stays empty without a return, so the trailing command is
        // also flagged as floating.
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].message, "No return statement found");
        assert_eq!(recorded[0].line, 1);
        assert_eq!(recorded[1].message, "Statement does not belong to any function");
    }

    #[test]
    fn declaration_interrupting_a_body_reports_both_problems() {
        let diagnostics = run(
            vec![decl("main", 1), plain(2), decl("g", 3), ret(4)],
            CompileMode::Executable,
        );
        let messages: Vec<&str> = diagnostics
            .recorded()
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect();
        assert_eq!(
            messages,
            [
                "Expected a return statement, but got a new function definition",
                "No return statement found",
            ]
        );
        assert_eq!(diagnostics.recorded()[0].line, 3);
        assert_eq!(diagnostics.recorded()[1].line, 1);
    }

    #[test]
    fn last_return_wins() {
        // Dead code between two returns still belongs to the body.
        let diagnostics = run(
            vec![decl("main", 1), ret(2), plain(3), ret(4)],
            CompileMode::Executable,
        );
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn commands_after_the_final_return_are_floating() {
        let diagnostics = run(
            vec![decl("main", 1), ret(2), plain(3)],
            CompileMode::Executable,
        );
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "Statement does not belong to any function");
        assert_eq!(recorded[0].line, 3);
    }
}

//! Semantic analysis over the parsed command stream. Each pass only reads
//! the stream and records what it finds; the driver decides afterwards
//! whether translation may run.

mod comparisons;
mod functions;

pub use comparisons::{check_same_picture, check_who_would_win};
pub use functions::check as check_functions;

use crate::CompileState;

pub fn check(state: &mut CompileState) {
    functions::check(
        &state.commands,
        state.mode,
        state.target,
        &mut state.diagnostics,
    );
    comparisons::check_who_would_win(&state.commands, &mut state.diagnostics);
    comparisons::check_same_picture(&state.commands, &mut state.diagnostics);
}

#[derive(Copy, Clone, Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("Statement does not belong to any function")]
    FloatingStatement,
    #[error("Expected a return statement, but got a new function definition")]
    ReturnExpected,
    #[error("No return statement found")]
    NoReturn,
    #[error("Duplicate function definition")]
    DuplicateFunction,
    #[error("An executable cannot be created if no main-function exists")]
    MainMissing,
    #[error("Comparison jump markers cannot be defined twice")]
    DuplicateJumpMarker,
    #[error("No comparison jump marker defined for first parameter")]
    FirstJumpMarkerMissing,
    #[error("No comparison jump marker defined for second parameter")]
    SecondJumpMarkerMissing,
    #[error("\"they're the same picture\" wasn't defined anywhere")]
    SamePictureMissing,
}

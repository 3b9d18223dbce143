//! Label analysis for the two comparison families. The families are
//! deliberately not symmetric: "Who would win?" markers are user-named and
//! checked pairwise for duplicates, while "they're the same picture" is one
//! global marker whose last occurrence simply wins, duplicates and all.

use commands::{CommandStream, ComparisonFamily, Family};
use log::debug;

use super::SemanticError;
use crate::diagnostics::Diagnostics;

struct Comparison<'a> {
    first: &'a str,
    second: &'a str,
    line: usize,
}

struct JumpMarker<'a> {
    parameter: &'a str,
    line: usize,
}

pub fn check_who_would_win(commands: &CommandStream, diagnostics: &mut Diagnostics) {
    let mut comparisons = Vec::new();
    let mut markers = Vec::new();
    for command in commands.iter() {
        match command.opcode.family() {
            Family::Compare(ComparisonFamily::WhoWouldWin) => comparisons.push(Comparison {
                first: command.parameter(0).unwrap_or_default(),
                second: command.parameter(1).unwrap_or_default(),
                line: command.line,
            }),
            Family::CompareLabel(ComparisonFamily::WhoWouldWin) => markers.push(JumpMarker {
                parameter: command.parameter(0).unwrap_or_default(),
                line: command.line,
            }),
            _ => {}
        }
    }
    debug!(
        "who-would-win check: {} comparison(s), {} marker(s)",
        comparisons.len(),
        markers.len()
    );

    for (position, marker) in markers.iter().enumerate() {
        for later in &markers[position + 1..] {
            if marker.parameter == later.parameter {
                diagnostics.error_with_extra(
                    SemanticError::DuplicateJumpMarker,
                    later.line,
                    marker.line,
                );
            }
        }
    }

    for comparison in &comparisons {
        let defined = |parameter: &str| markers.iter().any(|marker| marker.parameter == parameter);
        if !defined(comparison.first) {
            diagnostics.error(SemanticError::FirstJumpMarkerMissing, comparison.line);
        }
        if !defined(comparison.second) {
            diagnostics.error(SemanticError::SecondJumpMarkerMissing, comparison.line);
        }
    }
}

pub fn check_same_picture(commands: &CommandStream, diagnostics: &mut Diagnostics) {
    // Only the last marker occurrence is remembered; earlier ones are
    // silently shadowed.
    let mut marker_line = None;
    for command in commands.iter() {
        if command.opcode.family() == Family::CompareLabel(ComparisonFamily::SamePicture) {
            marker_line = Some(command.line);
        }
    }
    debug!("same-picture check: marker at {marker_line:?}");

    if marker_line.is_none() {
        for command in commands.iter() {
            if command.opcode.family() == Family::Compare(ComparisonFamily::SamePicture) {
                diagnostics.error(SemanticError::SamePictureMissing, command.line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::{Opcode, ParsedCommand};

    fn compare(first: &str, second: &str, line: usize) -> ParsedCommand {
        let mut command = ParsedCommand::new(Opcode::WHO_WOULD_WIN, line);
        command.parameters = [Some(first.into()), Some(second.into())];
        command
    }

    fn marker(parameter: &str, line: usize) -> ParsedCommand {
        let mut command = ParsedCommand::new(Opcode::WHO_WINS_MARKER, line);
        command.parameters[0] = Some(parameter.into());
        command
    }

    fn picture_compare(line: usize) -> ParsedCommand {
        ParsedCommand::new(Opcode::SAME_PICTURE_COMPARE, line)
    }

    fn picture_marker(line: usize) -> ParsedCommand {
        ParsedCommand::new(Opcode::SAME_PICTURE_MARKER, line)
    }

    #[test]
    fn resolved_markers_pass() {
        let stream = CommandStream::new(
            vec![compare("rax", "rbx", 1), marker("rax", 2), marker("rbx", 3)],
            0,
        );
        let mut diagnostics = Diagnostics::new();
        check_who_would_win(&stream, &mut diagnostics);
        assert_eq!(diagnostics.error_count(), 0);
    }

    #[test]
    fn missing_second_marker_is_the_only_report() {
        let stream = CommandStream::new(vec![compare("x", "y", 2), marker("x", 3)], 0);
        let mut diagnostics = Diagnostics::new();
        check_who_would_win(&stream, &mut diagnostics);
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].message,
            "No comparison jump marker defined for second parameter"
        );
        assert_eq!(recorded[0].line, 2);
    }

    #[test]
    fn both_parameters_can_be_unresolved_at_once() {
        let stream = CommandStream::new(vec![compare("x", "y", 4)], 0);
        let mut diagnostics = Diagnostics::new();
        check_who_would_win(&stream, &mut diagnostics);
        assert_eq!(diagnostics.error_count(), 2);
    }

    #[test]
    fn duplicate_markers_point_at_both_lines() {
        let stream = CommandStream::new(
            vec![compare("x", "x", 1), marker("x", 3), marker("x", 5)],
            0,
        );
        let mut diagnostics = Diagnostics::new();
        check_who_would_win(&stream, &mut diagnostics);
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].message,
            "Comparison jump markers cannot be defined twice"
        );
        assert_eq!(recorded[0].line, 5);
        assert_eq!(recorded[0].extra_line, Some(3));
    }

    #[test]
    fn every_same_picture_compare_is_flagged_without_a_marker() {
        let stream = CommandStream::new(vec![picture_compare(2), picture_compare(4)], 0);
        let mut diagnostics = Diagnostics::new();
        check_same_picture(&stream, &mut diagnostics);
        let recorded = diagnostics.recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(
            recorded[0].message,
            "\"they're the same picture\" wasn't defined anywhere"
        );
        assert_eq!(recorded[0].line, 2);
        assert_eq!(recorded[1].line, 4);
    }

    #[test]
    fn duplicate_same_picture_markers_are_tolerated() {
        // Unlike who-would-win markers; the asymmetry is intended.
        let stream = CommandStream::new(
            vec![picture_compare(1), picture_marker(2), picture_marker(3)],
            0,
        );
        let mut diagnostics = Diagnostics::new();
        check_same_picture(&stream, &mut diagnostics);
        assert_eq!(diagnostics.error_count(), 0);
    }
}

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::format::FormatError;

/// How much of a log to return, and whether to keep following it.
///
/// A count of `None` means the whole file. Present counts are never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailSpec {
    /// A bounded snapshot.
    Fixed(Option<NonZeroUsize>),
    /// A snapshot followed by new output until the client disconnects.
    Stream(Option<NonZeroUsize>),
}

const FOLLOW_MARKER: char = 'f';

/// Parses a tail token: an optional leading `f` (follow) then an optional
/// line count. `""` is the whole file, `"f"` the whole file then follow.
pub fn parse_tail_spec(token: &str) -> Result<TailSpec, FormatError> {
    let (follow, count) = match token.strip_prefix(FOLLOW_MARKER) {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let lines = if count.is_empty() {
        None
    } else if count.chars().all(|c| c == '0') {
        return Err(FormatError::ZeroLines);
    } else {
        let parsed = count
            .parse::<NonZeroUsize>()
            .map_err(|_| FormatError::InvalidLineCount {
                token: token.to_owned(),
            })?;
        Some(parsed)
    };

    Ok(if follow {
        TailSpec::Stream(lines)
    } else {
        TailSpec::Fixed(lines)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lines(count: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(count)
    }

    #[rstest]
    #[case("", TailSpec::Fixed(None))]
    #[case("42", TailSpec::Fixed(lines(42)))]
    #[case("f", TailSpec::Stream(None))]
    #[case("f42", TailSpec::Stream(lines(42)))]
    #[case("007", TailSpec::Fixed(lines(7)))]
    fn parses_valid_specs(#[case] token: &str, #[case] expected: TailSpec) {
        assert_eq!(parse_tail_spec(token).expect("valid tail spec"), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("f0")]
    #[case("000")]
    fn zero_lines_are_rejected(#[case] token: &str) {
        assert!(matches!(parse_tail_spec(token), Err(FormatError::ZeroLines)));
    }

    #[rstest]
    #[case("abc")]
    #[case("f-3")]
    #[case("ff")]
    #[case("-5")]
    fn non_numeric_counts_are_rejected(#[case] token: &str) {
        let error = parse_tail_spec(token).unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("\"{token}\" is not a valid number of lines")
        );
    }
}

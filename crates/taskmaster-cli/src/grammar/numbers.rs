use std::num::NonZeroU64;

use crate::format::FormatError;

/// Parses an instance index: any non-negative integer.
pub fn parse_index(token: &str) -> Result<usize, FormatError> {
    token
        .parse::<usize>()
        .map_err(|_| FormatError::InvalidIndex {
            token: token.to_owned(),
        })
}

/// Parses a strictly positive integer.
pub fn parse_positive(token: &str) -> Result<NonZeroU64, FormatError> {
    token
        .parse::<NonZeroU64>()
        .map_err(|_| FormatError::NotPositive {
            token: token.to_owned(),
        })
}

/// Parses a TCP port in `0..=65535`.
pub fn parse_port(token: &str) -> Result<u16, FormatError> {
    token.parse::<u16>().map_err(|_| FormatError::InvalidPort {
        token: token.to_owned(),
    })
}

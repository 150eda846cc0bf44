//! Signal name resolution.
//!
//! The table below is part of the wire contract with `taskmasterd`: the
//! daemon receives bare signal numbers, so both sides must agree on the
//! numbering. Bump [`SIGNAL_TABLE_VERSION`] whenever an entry changes.

/// Revision of [`SIGNALS`]. Numbering follows Linux.
pub const SIGNAL_TABLE_VERSION: u32 = 1;

/// Prefix carried by every canonical signal name.
pub const SIGNAL_PREFIX: &str = "SIG";

static SIGNALS: &[(&str, u8)] = &[
    ("SIGHUP", 1),
    ("SIGINT", 2),
    ("SIGQUIT", 3),
    ("SIGILL", 4),
    ("SIGTRAP", 5),
    ("SIGABRT", 6),
    ("SIGIOT", 6),
    ("SIGBUS", 7),
    ("SIGFPE", 8),
    ("SIGKILL", 9),
    ("SIGUSR1", 10),
    ("SIGSEGV", 11),
    ("SIGUSR2", 12),
    ("SIGPIPE", 13),
    ("SIGALRM", 14),
    ("SIGTERM", 15),
    ("SIGSTKFLT", 16),
    ("SIGCHLD", 17),
    ("SIGCLD", 17),
    ("SIGCONT", 18),
    ("SIGSTOP", 19),
    ("SIGTSTP", 20),
    ("SIGTTIN", 21),
    ("SIGTTOU", 22),
    ("SIGURG", 23),
    ("SIGXCPU", 24),
    ("SIGXFSZ", 25),
    ("SIGVTALRM", 26),
    ("SIGPROF", 27),
    ("SIGWINCH", 28),
    ("SIGIO", 29),
    ("SIGPOLL", 29),
    ("SIGPWR", 30),
    ("SIGSYS", 31),
    ("SIGRTMIN", 34),
    ("SIGRTMAX", 64),
];

/// Resolves a numeric or symbolic signal token.
///
/// Integers in `0..=255` are used as-is. Anything else is upper-cased,
/// given the `SIG` prefix when it lacks one, and looked up by name, so
/// `15`, `SIGTERM`, `term` and `Term` all resolve to the same number.
#[must_use]
pub fn resolve_signal(token: &str) -> Option<u8> {
    if let Ok(number) = token.parse::<i64>()
        && let Ok(signal) = u8::try_from(number)
    {
        return Some(signal);
    }

    let mut name = token.to_ascii_uppercase();
    if !name.starts_with(SIGNAL_PREFIX) {
        name.insert_str(0, SIGNAL_PREFIX);
    }
    SIGNALS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}

/// Canonical names understood by [`resolve_signal`], in table order.
pub fn signal_names() -> impl Iterator<Item = &'static str> {
    SIGNALS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("15")]
    #[case("SIGTERM")]
    #[case("term")]
    #[case("Term")]
    #[case("sigterm")]
    fn spellings_of_term_agree(#[case] token: &str) {
        assert_eq!(resolve_signal(token), Some(15));
    }

    #[rstest]
    #[case("0", 0)]
    #[case("255", 255)]
    #[case("HUP", 1)]
    #[case("kill", 9)]
    #[case("usr1", 10)]
    fn resolves_numbers_and_names(#[case] token: &str, #[case] expected: u8) {
        assert_eq!(resolve_signal(token), Some(expected));
    }

    #[rstest]
    #[case("999")]
    #[case("256")]
    #[case("-1")]
    #[case("bogus")]
    #[case("SIG")]
    #[case("")]
    fn unresolvable_tokens_yield_none(#[case] token: &str) {
        assert_eq!(resolve_signal(token), None);
    }

    #[test]
    fn every_name_carries_the_prefix() {
        assert!(signal_names().all(|name| name.starts_with(SIGNAL_PREFIX)));
    }
}

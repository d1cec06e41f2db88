use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::*;

/// A joint emission symbol `(p, q)` observed at one time step.
///
/// The pair `(0, 0)` is reserved: it marks a silent (non-emitting) step, and the recurrences skip
/// the emission factor there instead of reading `B[i][0][0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Symbol {
    pub p: usize,
    pub q: usize,
}

impl Symbol {
    /// The silent sentinel `(0, 0)`.
    pub const SILENT: Symbol = Symbol { p: 0, q: 0 };

    pub fn new(p: usize, q: usize) -> Symbol {
        Symbol { p, q }
    }

    pub fn is_silent(&self) -> bool {
        self.p == 0 && self.q == 0
    }
}

impl From<(usize, usize)> for Symbol {
    fn from((p, q): (usize, usize)) -> Symbol {
        Symbol { p, q }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.p, self.q)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?P<p>\d+)\s*[:/]\s*(?P<q>\d+)\s*$").expect("symbol pattern is valid")
    })
}

impl FromStr for Symbol {
    type Err = HmmError;

    /// Parses tokens of the form `p:q` (or `p/q`).
    fn from_str(s: &str) -> Result<Symbol> {
        let caps = token_pattern()
            .captures(s)
            .ok_or_else(|| HmmError::Parse(format!("invalid symbol token {:?}", s)))?;
        let parse = |name: &str| {
            caps[name]
                .parse::<usize>()
                .map_err(|err| HmmError::Parse(format!("symbol {:?}: {}", s, err)))
        };
        Ok(Symbol { p: parse("p")?, q: parse("q")? })
    }
}

/// Shorthand for building a sequence out of `(p, q)` tuples.
pub fn sequence(pairs: &[(usize, usize)]) -> Vec<Symbol> {
    pairs.iter().map(|&pair| Symbol::from(pair)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_separators() {
        assert_eq!("3:4".parse::<Symbol>().unwrap(), Symbol::new(3, 4));
        assert_eq!(" 10 / 2 ".parse::<Symbol>().unwrap(), Symbol::new(10, 2));
    }

    #[test]
    fn rejects_garbage() {
        assert!("3".parse::<Symbol>().is_err());
        assert!("a:b".parse::<Symbol>().is_err());
        assert!("-1:2".parse::<Symbol>().is_err());
    }

    #[test]
    fn only_zero_zero_is_silent() {
        assert!(Symbol::SILENT.is_silent());
        assert!(!Symbol::new(0, 1).is_silent());
        assert!(!Symbol::new(1, 0).is_silent());
    }
}

//! Error taxonomy shared by every wayfind crate.

use thiserror::Error;

/// Errors surfaced by graph construction, mutation and search.
///
/// "No path exists" is deliberately *not* an error: search engines signal it
/// by returning an empty path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An input was rejected before any search ran: a vertex id outside
    /// `0..size`, a negative weight where a non-negative one is required, a
    /// mismatched weight-vector length, or an unknown policy value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The cooperative expansion budget was exhausted mid-search.
    #[error("search exceeded its expansion budget of {limit} nodes")]
    Timeout { limit: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = Error::InvalidArgument("node 9 is out of range".into());
        assert_eq!(e.to_string(), "invalid argument: node 9 is out of range");

        let t = Error::Timeout { limit: 500 };
        assert_eq!(
            t.to_string(),
            "search exceeded its expansion budget of 500 nodes"
        );
    }
}

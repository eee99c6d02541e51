use thiserror::Error;

use crate::kind::Kind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// The active space couldn't fit the request, even after a collection.
    #[error("out of memory: requested {requested} bytes, {remaining} remaining after collection")]
    OutOfMemory { requested: usize, remaining: usize },

    /// The two semi-spaces must be the same size, or a full live set might
    /// not fit when it's copied.
    #[error("semi-spaces must have equal capacity (active {active}, standby {standby})")]
    CapacityMismatch { active: usize, standby: usize },

    #[error("no trace routine registered for {0}")]
    UnregisteredKind(Kind),

    #[error("{0} values don't live in the heap")]
    NotHeapKind(Kind),

    #[error("trace routine for {0} is already registered")]
    DuplicateTrace(Kind),

    #[error("invalid heap size: {0}")]
    InvalidHeapSize(String),
}

pub type Result<T> = core::result::Result<T, GcError>;


#[cfg(test)]
mod tests {
    use super::GcError;
    use crate::Kind;

    #[test]
    fn messages() {
        assert_eq!(
            GcError::OutOfMemory { requested: 64, remaining: 8 }.to_string(),
            "out of memory: requested 64 bytes, 8 remaining after collection"
        );
        assert_eq!(GcError::UnregisteredKind(Kind::Record).to_string(), "no trace routine registered for Record");
        assert_eq!(GcError::NotHeapKind(Kind::Null).to_string(), "Null values don't live in the heap");
    }
}

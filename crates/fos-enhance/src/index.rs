//! Negative index resolution

/// Result of resolving a possibly-negative index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedIndex {
    InBounds(usize),
    /// Offset after resolution, still outside `[0, length)`
    OutOfBounds(i64),
}

impl ResolvedIndex {
    /// Offset after resolution, in or out of bounds
    pub fn offset(self) -> i64 {
        match self {
            Self::InBounds(i) => i64::try_from(i).unwrap_or(i64::MAX),
            Self::OutOfBounds(i) => i,
        }
    }
}

/// Map `index` onto `[0, length)`. Negative indices count from the end,
/// once; `-(length + 1)` stays out of bounds rather than wrapping again.
pub fn resolve_index(index: i64, length: usize) -> ResolvedIndex {
    let len = i64::try_from(length).unwrap_or(i64::MAX);
    let offset = if index < 0 { len.saturating_add(index) } else { index };
    if (0..len).contains(&offset) {
        ResolvedIndex::InBounds(offset as usize)
    } else {
        ResolvedIndex::OutOfBounds(offset)
    }
}

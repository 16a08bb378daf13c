//! Per-record outcome of a mapping pass.

/// Result of processing one record (one line, or a whole document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// 1-based position of the record in its file.
    pub ordinal: u64,
    /// Statements the mapper produced for the record, before reconciliation.
    pub produced: u64,
    pub success: bool,
}

impl RecordOutcome {
    #[must_use]
    pub const fn succeeded(ordinal: u64, produced: u64) -> Self {
        Self {
            ordinal,
            produced,
            success: true,
        }
    }

    #[must_use]
    pub const fn failed(ordinal: u64, produced: u64) -> Self {
        Self {
            ordinal,
            produced,
            success: false,
        }
    }
}

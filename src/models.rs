use std::fmt;

/// One teller-transaction-count observation parsed from an inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TellerTotal {
    /// Business date encoded as an 8-digit YYYYMMDD integer.
    pub process_date: u32,
    pub branch: i64,
    pub user: i64,
    pub tx_count: i64,
}

impl fmt::Display for TellerTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "process_date={} branch={} user={} tx_count={}",
            self.process_date, self.branch, self.user, self.tx_count
        )
    }
}

/// What a single import attempt did with one inbound file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Batch committed in this run; file is due for archiving.
    Committed { records: usize, process_date: u32 },
    /// Checksum already in the imports ledger: committed by an earlier run
    /// whose archive move failed. Nothing reinserted; file is due for
    /// archiving again.
    AlreadyImported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teller_total_display() {
        let total = TellerTotal {
            process_date: 20240601,
            branch: 101,
            user: 55,
            tx_count: 42,
        };
        assert_eq!(
            total.to_string(),
            "process_date=20240601 branch=101 user=55 tx_count=42"
        );
    }
}

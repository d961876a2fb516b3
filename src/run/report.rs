use serde::{Deserialize, Serialize};

/// Tallies of one completed run.
///
/// `matched <= discovered` and `filled <= matched` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub discovered: usize,
    pub matched: usize,
    pub filled: usize,
    /// Integer percent of discovered fields that resolved to a value.
    pub match_rate: u32,
}

impl RunReport {
    pub fn new(discovered: usize, matched: usize, filled: usize) -> Self {
        Self {
            discovered,
            matched,
            filled,
            match_rate: match_rate(matched, discovered),
        }
    }

    /// Final status line shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "Completed. Filled {} fields. Match rate {}/{} ({}%).",
            self.filled, self.matched, self.discovered, self.match_rate
        )
    }
}

/// `round(100 * matched / discovered)`, 0 when nothing was discovered.
pub fn match_rate(matched: usize, discovered: usize) -> u32 {
    if discovered == 0 {
        return 0;
    }
    (100.0 * matched as f64 / discovered as f64).round() as u32
}

use euchre_core::analysis::AnalysisWeights;

/// Tunable bidding parameters.
///
/// A bid is made only when the hand score strictly exceeds the threshold for
/// the bidder's position. Round one is indexed by position 0-3 (3 is the
/// dealer, who values the hand after picking up); round two by position 4-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotParams {
    /// Order-up thresholds by first-round position (default: 30, 30, 30, 27)
    pub round1_thresholds: [i32; 4],

    /// Calling thresholds by second-round position (default: 30, 29, 28, 26)
    pub round2_thresholds: [i32; 4],

    /// Hand score weights handed to the analyzer
    pub weights: AnalysisWeights,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            round1_thresholds: [30, 30, 30, 27],
            round2_thresholds: [30, 29, 28, 26],
            weights: AnalysisWeights::default(),
        }
    }
}

impl BotParams {
    pub fn threshold(&self, position: usize) -> i32 {
        if position < 4 {
            self.round1_thresholds[position]
        } else {
            self.round2_thresholds[(position - 4).min(3)]
        }
    }
}

//! Tallying and quorum

use serde::{Deserialize, Serialize};

use dao_core::{mul_div, Amount, PRECISION};

/// Outcome of counting a proposal's votes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    /// Lowest index among the options with the highest tally
    pub winning_option: usize,
    #[serde(with = "dao_core::serde_amount")]
    pub winning_votes: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub total_votes: Amount,
    #[serde(with = "dao_core::serde_amount")]
    pub quorum_required: Amount,
}

impl Tally {
    pub fn compute(
        votes_by_option: &[Amount],
        snapshot_total_supply: Amount,
        min_quorum_fraction: Amount,
    ) -> Self {
        let (winning_option, winning_votes) = winning_option(votes_by_option);
        Self {
            winning_option,
            winning_votes,
            total_votes: votes_by_option
                .iter()
                .fold(0, |acc: Amount, v| acc.saturating_add(*v)),
            quorum_required: quorum_threshold(snapshot_total_supply, min_quorum_fraction),
        }
    }

    pub fn meets_quorum(&self) -> bool {
        self.winning_votes >= self.quorum_required
    }

    /// Participation relative to the snapshot supply, in percent
    pub fn participation_rate(&self, snapshot_total_supply: Amount) -> Amount {
        if snapshot_total_supply == 0 {
            return 0;
        }
        mul_div(self.total_votes, 100, snapshot_total_supply).unwrap_or(100)
    }
}

/// First option holding the strictly highest tally
pub fn winning_option(votes_by_option: &[Amount]) -> (usize, Amount) {
    let mut best = (0, 0);
    for (index, votes) in votes_by_option.iter().enumerate() {
        if *votes > best.1 {
            best = (index, *votes);
        }
    }
    best
}

/// Minimum winning tally: `fraction * supply / PRECISION`, rounded down
pub fn quorum_threshold(snapshot_total_supply: Amount, min_quorum_fraction: Amount) -> Amount {
    // fraction <= PRECISION, so the result never exceeds the supply
    mul_div(snapshot_total_supply, min_quorum_fraction, PRECISION).unwrap_or(snapshot_total_supply)
}

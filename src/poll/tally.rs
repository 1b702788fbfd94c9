use std::fmt;

use crate::bot::client::OptionCount;
use crate::database::models::OptionTally;

/// Who won a closed poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Winner(String),
    /// Every option sharing the top count, in the poll's option order
    Tie(Vec<String>),
    NoVotes,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(option) => f.write_str(option),
            Outcome::Tie(options) => write!(f, "Tie between: {}", options.join(", ")),
            Outcome::NoVotes => f.write_str("No votes received"),
        }
    }
}

/// Results of a closed poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub total_votes: i64,
    /// Empty when nobody voted
    pub options: Vec<OptionTally>,
    pub outcome: Outcome,
}

impl Tally {
    /// Computes percentages and the outcome from the counts reported when the poll closed.
    ///
    /// With zero voters no percentage is computed and the outcome is [`Outcome::NoVotes`].
    pub fn from_counts(total_voters: i64, counts: &[OptionCount]) -> Self {
        if total_voters <= 0 || counts.is_empty() {
            return Self {
                total_votes: total_voters.max(0),
                options: Vec::new(),
                outcome: Outcome::NoVotes,
            };
        }

        let options: Vec<OptionTally> = counts
            .iter()
            .map(|count| OptionTally {
                option_text: count.text.clone(),
                votes: count.voter_count,
                percentage: count.voter_count as f64 / total_voters as f64 * 100.0,
            })
            .collect();

        let max_votes = options.iter().map(|o| o.votes).max().unwrap_or(0);
        let mut leaders: Vec<String> = options
            .iter()
            .filter(|o| o.votes == max_votes)
            .map(|o| o.option_text.clone())
            .collect();

        let outcome = if leaders.len() == 1 {
            Outcome::Winner(leaders.remove(0))
        } else {
            Outcome::Tie(leaders)
        };

        Self {
            total_votes: total_voters,
            options,
            outcome,
        }
    }
}

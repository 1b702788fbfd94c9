use daily_poll_bot::bot::client::OptionCount;
use daily_poll_bot::poll::{cleanup_targets, Outcome, Tally};
use daily_poll_bot::utils::validation::*;

fn counts(labels: &[&str], votes: &[i64]) -> Vec<OptionCount> {
    labels
        .iter()
        .zip(votes)
        .map(|(text, voter_count)| OptionCount { text: text.to_string(), voter_count: *voter_count })
        .collect()
}

#[cfg(test)]
mod tally_tests {
    use super::*;

    const LABELS: [&str; 4] = ["Pizza", "Tacos", "Sushi", "Curry"];

    #[test]
    fn test_unique_maximum_wins() {
        let distributions: [[i64; 4]; 5] = [
            [5, 0, 0, 0],
            [0, 0, 0, 1],
            [3, 4, 2, 1],
            [10, 9, 9, 9],
            [1, 2, 3, 4],
        ];

        for votes in distributions {
            let total = votes.iter().sum();
            let tally = Tally::from_counts(total, &counts(&LABELS, &votes));

            let (best, _) = votes.iter().enumerate().max_by_key(|(_, v)| **v).unwrap_or((0, &0));
            assert_eq!(tally.outcome, Outcome::Winner(LABELS[best].to_string()), "votes {:?}", votes);
        }
    }

    #[test]
    fn test_shared_maximum_is_a_tie_in_option_order() {
        let cases: [([i64; 4], &[&str]); 4] = [
            ([2, 2, 0, 0], &["Pizza", "Tacos"]),
            ([0, 3, 1, 3], &["Tacos", "Curry"]),
            ([1, 1, 1, 1], &["Pizza", "Tacos", "Sushi", "Curry"]),
            ([4, 0, 4, 4], &["Pizza", "Sushi", "Curry"]),
        ];

        for (votes, leaders) in cases {
            let total = votes.iter().sum();
            let tally = Tally::from_counts(total, &counts(&LABELS, &votes));

            let expected: Vec<String> = leaders.iter().map(|s| s.to_string()).collect();
            assert_eq!(tally.outcome, Outcome::Tie(expected), "votes {:?}", votes);
            assert_eq!(tally.outcome.to_string(), format!("Tie between: {}", leaders.join(", ")));
        }
    }

    #[test]
    fn test_zero_votes_never_divides() {
        let tally = Tally::from_counts(0, &counts(&LABELS, &[0, 0, 0, 0]));

        assert_eq!(tally.total_votes, 0);
        assert!(tally.options.is_empty());
        assert_eq!(tally.outcome, Outcome::NoVotes);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let tally = Tally::from_counts(7, &counts(&LABELS, &[3, 2, 1, 1]));

        let sum: f64 = tally.options.iter().map(|o| o.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(tally.options.len(), 4);
    }

    #[test]
    fn test_cleanup_targets_from_duplicates() {
        assert_eq!(cleanup_targets(&[5, 5, 7, 7, 9], 9), vec![5, 7]);
        assert_eq!(cleanup_targets(&[9, 9, 9], 9), Vec::<i32>::new());
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_poll_options() {
        let valid = vec![
            "Yes|No",
            " Pizza | Tacos | Sushi ",
            "Fish & Chips|<None>",
            "1|2|3|4|5|6|7|8|9|10",
        ];

        for options in valid {
            assert!(validate_poll_options(options).is_ok(), "Should accept options: {}", options);
        }
    }

    #[test]
    fn test_invalid_poll_options() {
        let too_long = format!("{}|B", "A".repeat(MAX_OPTION_LENGTH + 1));
        let invalid = vec![
            "".to_string(),
            "Only one".to_string(),
            "|||".to_string(),
            "1|2|3|4|5|6|7|8|9|10|11".to_string(),
            too_long,
        ];

        for options in invalid {
            assert!(validate_poll_options(&options).is_err(), "Should reject options: {}", options);
        }
    }

    #[test]
    fn test_valid_telegram_chat_ids() {
        for chat_id in [1, 123456789, -12345, -1001234567890] {
            assert!(validate_telegram_chat_id(chat_id).is_ok(), "Should accept chat id: {}", chat_id);
        }
    }

    #[test]
    fn test_invalid_telegram_chat_ids() {
        for chat_id in [0, 2147483648, -2000000000001] {
            assert!(validate_telegram_chat_id(chat_id).is_err(), "Should reject chat id: {}", chat_id);
        }
    }

    #[test]
    fn test_poll_timing() {
        assert!(validate_poll_timing(60, 15).is_ok());
        assert!(validate_poll_timing(2, 1).is_ok());
        assert!(validate_poll_timing(60, 0).is_ok());
        assert!(validate_poll_timing(15, 15).is_err());
        assert!(validate_poll_timing(15, 45).is_err());
        assert!(validate_poll_timing(0, 0).is_err());
    }
}

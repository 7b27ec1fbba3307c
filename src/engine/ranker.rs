use crate::domain::CardResult;

/// Order results, apply the caller's limit, and assign 1-based ranks.
///
/// Primary key is reward amount, not percentage: a modest rate on a
/// large spend can out-earn a high rate once its cap bites. Ties fall
/// back to percentage, then to card name for a stable, reproducible
/// order.
pub fn rank(mut results: Vec<CardResult>, limit: Option<usize>) -> Vec<CardResult> {
    results.sort_by(|a, b| {
        b.reward_amount
            .cmp(&a.reward_amount)
            .then(b.percentage.cmp(&a.percentage))
            .then(a.card_name.cmp(&b.card_name))
    });

    if let Some(limit) = limit {
        results.truncate(limit);
    }

    for (i, result) in results.iter_mut().enumerate() {
        result.rank = (i + 1) as u32;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CardId;
    use rust_decimal::Decimal;

    fn result(name: &str, reward_cents: i64, percentage: i64) -> CardResult {
        CardResult {
            rank: 0,
            card_id: CardId::new(name.to_lowercase()),
            card_name: name.to_string(),
            bank: "Bank".to_string(),
            image_url: None,
            apply_url: None,
            rule_description: String::new(),
            percentage: Decimal::new(percentage, 0),
            reward_amount: Decimal::new(reward_cents, 2),
            points_amount: None,
            points_currency: None,
            requires_registration: false,
            is_capped: false,
            over_cap_info: None,
            date_suggestion: None,
            spending_suggestion: None,
        }
    }

    #[test]
    fn test_sorts_by_reward_descending() {
        let ranked = rank(
            vec![result("A", 1000, 1), result("B", 5000, 2), result("C", 3000, 3)],
            None,
        );

        let names: Vec<&str> = ranked.iter().map(|r| r.card_name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_percentage_breaks_reward_tie() {
        // Same $50.00 reward; 2% card ranks above 1%
        let ranked = rank(vec![result("OnePercent", 5000, 1), result("TwoPercent", 5000, 2)], None);
        assert_eq!(ranked[0].card_name, "TwoPercent");
    }

    #[test]
    fn test_name_breaks_full_tie() {
        let ranked = rank(vec![result("Zed", 5000, 2), result("Alpha", 5000, 2)], None);
        assert_eq!(ranked[0].card_name, "Alpha");
        assert_eq!(ranked[1].card_name, "Zed");
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let ranked = rank(
            vec![result("A", 1000, 1), result("B", 5000, 2), result("C", 3000, 3)],
            Some(2),
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].card_name, "B");
        assert_eq!(ranked[1].card_name, "C");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_deterministic_ordering() {
        let input = vec![
            result("B", 5000, 2),
            result("A", 5000, 2),
            result("C", 1000, 1),
        ];
        let first = rank(input.clone(), None);
        let second = rank(input, None);

        let order = |rs: &[CardResult]| -> Vec<String> {
            rs.iter().map(|r| r.card_name.clone()).collect()
        };
        assert_eq!(order(&first), order(&second));
    }
}

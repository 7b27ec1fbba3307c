use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{Cap, CapType, Card, CardRule, EngineError, RewardPreference};

/// Computed reward for one card under one selected rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardQuote {
    /// Effective rate in percent
    pub percentage: Decimal,

    /// Cash reward, or cash-equivalent of points under the miles
    /// preference; the cross-card ranking key
    pub reward_amount: Decimal,

    pub points_amount: Option<Decimal>,
    pub points_currency: Option<String>,

    pub is_capped: bool,

    /// The cap that was applied, when one bit
    pub applied_cap: Option<Cap>,
}

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round money half-up to 2 decimal places. Truncation would
/// systematically under-report the reward.
fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // round_dp only lowers scale; pad so "40" serializes as "40.00"
    rounded.rescale(2);
    rounded
}

/// Compute the reward for `amount` under `rule`.
///
/// Caps are static ceilings per call: there is no cross-transaction
/// spend ledger, so a monthly cap and a per-transaction cap clamp the
/// same way here.
pub fn compute(
    card: &Card,
    rule: &CardRule,
    amount: Decimal,
    preference: RewardPreference,
) -> Result<RewardQuote, EngineError> {
    if amount < Decimal::ZERO {
        return Err(EngineError::NegativeAmount(amount));
    }

    // A spending cap limits the qualifying spend before any rate applies
    let (qualifying_spend, mut is_capped, mut applied_cap) = match rule.cap {
        Some(cap) if cap.cap_type == CapType::Spending && amount > cap.amount => {
            (cap.amount, true, Some(cap))
        }
        _ => (amount, false, None),
    };

    if preference == RewardPreference::Miles {
        if let Some(program) = &card.points_program {
            let raw_points = qualifying_spend * program.points_per_unit;
            let raw_value = raw_points * program.point_value;

            let (points, value) = match rule.cap {
                Some(cap) if cap.cap_type == CapType::Reward && raw_value > cap.amount => {
                    is_capped = true;
                    applied_cap = Some(cap);
                    // Clamp the cash value; scale points to match
                    let points = if program.point_value > Decimal::ZERO {
                        cap.amount / program.point_value
                    } else {
                        raw_points
                    };
                    (points, cap.amount)
                }
                _ => (raw_points, raw_value),
            };

            return Ok(RewardQuote {
                percentage: rule.percentage,
                reward_amount: round_money(value),
                points_amount: Some(round_money(points)),
                points_currency: Some(program.currency.clone()),
                is_capped,
                applied_cap,
            });
        }
        // No points program: fall through to cash math
    }

    let raw_reward = qualifying_spend * rule.percentage / HUNDRED;

    let reward = match rule.cap {
        Some(cap) if cap.cap_type == CapType::Reward && raw_reward > cap.amount => {
            is_capped = true;
            applied_cap = Some(cap);
            cap.amount
        }
        _ => raw_reward,
    };

    Ok(RewardQuote {
        percentage: rule.percentage,
        reward_amount: round_money(reward),
        points_amount: None,
        points_currency: None,
        is_capped,
        applied_cap,
    })
}

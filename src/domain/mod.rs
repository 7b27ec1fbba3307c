pub mod card;
pub mod error;
pub mod result;
pub mod rule;
pub mod transaction;

pub use card::{Card, CardId, PointsProgram};
pub use error::EngineError;
pub use result::{CardResult, DateSuggestion, OverCapInfo, SpendingSuggestion};
pub use rule::{Cap, CapPeriod, CapType, CardRule, MatchCondition, MatchType, RawRule, RuleError};
pub use transaction::{PaymentMethod, RewardPreference, TxContext};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a conversion goal.
///
/// User-defined goals always have positive ids. Non-positive ids are reserved
/// for the ecommerce pseudo-goals, which produce their own per-goal records
/// but are kept out of the cross-goal overview tables and (for the abandoned
/// cart) out of the overall totals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GoalId(pub i64);

/// Pseudo-goal tracking abandoned ecommerce carts. A "negative conversion":
/// archived per-goal like any other, excluded from overall totals.
pub const GOAL_CART_ABANDONED: GoalId = GoalId(-1);

/// Pseudo-goal tracking completed ecommerce orders.
pub const GOAL_ORDER: GoalId = GoalId(0);

/// Goal ids owned by the ecommerce subsystem rather than the goal catalog.
pub const ECOMMERCE_GOAL_IDS: [GoalId; 2] = [GOAL_CART_ABANDONED, GOAL_ORDER];

impl GoalId {
    /// Whether this id is one of the reserved ecommerce pseudo-goals.
    pub fn is_ecommerce(self) -> bool {
        matches!(self.0, -1 | 0)
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

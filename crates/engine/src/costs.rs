//! The cost catalog.
//!
//! A pure mapping from enhancement kind and level/tag to a mana price. The
//! priority schedule is strictly increasing with level; the aura price is
//! flat. No state, safe to call unboundedly.

use std::collections::BTreeMap;

use crate::{
    EngineError, ResultEngine,
    enhancements::{AuraTag, EnhancementKind},
};

/// Mana price for priority levels 1 through 5.
pub const PRIORITY_COSTS: [i64; 5] = [10, 25, 50, 100, 200];

/// Flat mana price for any aura tag.
pub const AURA_COST: i64 = 50;

/// Safety bound on account balances, not a business feature.
pub const BALANCE_CEILING: i64 = 1_000_000;

pub const MIN_PRIORITY_LEVEL: i32 = 1;
pub const MAX_PRIORITY_LEVEL: i32 = 5;

/// Price for a single priority level.
pub fn priority_cost(level: i32) -> ResultEngine<i64> {
    if !(MIN_PRIORITY_LEVEL..=MAX_PRIORITY_LEVEL).contains(&level) {
        return Err(EngineError::Validation(format!(
            "priority level must be between {MIN_PRIORITY_LEVEL} and {MAX_PRIORITY_LEVEL}, got {level}"
        )));
    }
    Ok(PRIORITY_COSTS[(level - 1) as usize])
}

/// Price for an enhancement request.
///
/// `level` is meaningful only for `priority`, `aura_tag` only for `aura`;
/// the irrelevant argument is ignored.
pub fn cost_of(
    kind: EnhancementKind,
    level: Option<i32>,
    aura_tag: Option<AuraTag>,
) -> ResultEngine<i64> {
    match kind {
        EnhancementKind::Priority => {
            let level = level.ok_or_else(|| {
                EngineError::Validation("level is required for priority enhancements".to_string())
            })?;
            priority_cost(level)
        }
        EnhancementKind::Aura => {
            aura_tag.ok_or_else(|| {
                EngineError::Validation("aura_tag is required for aura enhancements".to_string())
            })?;
            Ok(AURA_COST)
        }
    }
}

/// Read-only schedule map exposed to clients for display.
pub fn cost_schedule() -> BTreeMap<String, i64> {
    let mut schedule = BTreeMap::new();
    for (index, cost) in PRIORITY_COSTS.iter().enumerate() {
        schedule.insert(format!("priority:{}", index + 1), *cost);
    }
    schedule.insert("aura".to_string(), AURA_COST);
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_schedule_is_strictly_increasing() {
        for pair in PRIORITY_COSTS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn priority_costs_by_level() {
        assert_eq!(priority_cost(1).unwrap(), 10);
        assert_eq!(priority_cost(3).unwrap(), 50);
        assert_eq!(priority_cost(5).unwrap(), 200);
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        assert!(priority_cost(0).is_err());
        assert!(priority_cost(6).is_err());
    }

    #[test]
    fn aura_cost_is_flat() {
        for tag in AuraTag::ALL {
            assert_eq!(
                cost_of(EnhancementKind::Aura, None, Some(tag)).unwrap(),
                AURA_COST
            );
        }
    }

    #[test]
    fn missing_inputs_are_rejected() {
        assert!(cost_of(EnhancementKind::Priority, None, None).is_err());
        assert!(cost_of(EnhancementKind::Aura, None, None).is_err());
    }

    #[test]
    fn schedule_map_covers_all_prices() {
        let schedule = cost_schedule();
        assert_eq!(schedule.len(), PRIORITY_COSTS.len() + 1);
        assert_eq!(schedule["priority:5"], 200);
        assert_eq!(schedule["aura"], AURA_COST);
    }
}

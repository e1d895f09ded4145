//! Pure validation rules for enhancement requests.
//!
//! [`validate`] takes snapshots and returns a [`Verdict`]; it performs no I/O
//! and never mutates state. The coordinator re-runs it against fresh state
//! inside the database transaction, so a passing pre-check here is advisory
//! only. The balance argument follows the same split: `Some` for the
//! read-only pre-flight, `None` when the atomic debit is about to decide.

use crate::{
    costs,
    enhancements::{AuraTag, EnhancementKind},
    wishes::WishStatus,
};

/// What a caller is asking to apply.
#[derive(Clone, Debug)]
pub struct EnhancementRequest {
    pub user_id: String,
    pub kind: EnhancementKind,
    pub level: Option<i32>,
    pub aura_tag: Option<AuraTag>,
}

/// Snapshot of the wish state the rules run against.
#[derive(Clone, Debug)]
pub struct WishContext {
    pub owner_id: String,
    pub status: WishStatus,
    /// Level of the active priority enhancement, if any.
    pub current_level: Option<i32>,
    /// Tag of the active aura enhancement, if any.
    pub current_aura: Option<AuraTag>,
}

/// Structured validation verdict.
///
/// `is_valid` reports the business rules; `can_apply` additionally accounts
/// for the advisory balance check when a balance was supplied.
#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    pub can_apply: bool,
    pub cost: Option<i64>,
    pub errors: Vec<String>,
    pub current_level: Option<i32>,
}

pub fn validate(req: &EnhancementRequest, wish: &WishContext, balance: Option<i64>) -> Verdict {
    let mut errors = Vec::new();

    if req.user_id != wish.owner_id {
        errors.push("only the wish owner can apply enhancements".to_string());
    }
    if !wish.status.is_active() {
        errors.push(format!("wish is {}, not active", wish.status.as_str()));
    }

    match req.kind {
        EnhancementKind::Priority => validate_priority(req.level, wish.current_level, &mut errors),
        EnhancementKind::Aura => validate_aura(req.aura_tag, wish.current_aura, &mut errors),
    }

    let is_valid = errors.is_empty();
    let cost = if is_valid {
        costs::cost_of(req.kind, req.level, req.aura_tag).ok()
    } else {
        None
    };

    let mut can_apply = is_valid;
    if let (Some(balance), Some(cost)) = (balance, cost)
        && balance < cost
    {
        errors.push(format!(
            "insufficient balance: required {cost}, available {balance}"
        ));
        can_apply = false;
    }

    Verdict {
        is_valid,
        can_apply,
        cost,
        errors,
        current_level: wish.current_level,
    }
}

fn validate_priority(level: Option<i32>, current_level: Option<i32>, errors: &mut Vec<String>) {
    let Some(level) = level else {
        errors.push("level is required for priority enhancements".to_string());
        return;
    };
    if !(costs::MIN_PRIORITY_LEVEL..=costs::MAX_PRIORITY_LEVEL).contains(&level) {
        errors.push(format!(
            "priority level must be between {} and {}, got {level}",
            costs::MIN_PRIORITY_LEVEL,
            costs::MAX_PRIORITY_LEVEL
        ));
        return;
    }
    match current_level {
        Some(current) if current >= costs::MAX_PRIORITY_LEVEL => {
            errors.push("maximum priority level reached".to_string());
        }
        Some(current) if level <= current => {
            errors.push(format!(
                "priority level must exceed the current level {current}"
            ));
        }
        _ => {}
    }
}

fn validate_aura(tag: Option<AuraTag>, current_aura: Option<AuraTag>, errors: &mut Vec<String>) {
    if tag.is_none() {
        errors.push("aura_tag is required for aura enhancements".to_string());
        return;
    }
    if let Some(current) = current_aura {
        errors.push(format!(
            "wish already has the {} aura applied",
            current.as_str()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: EnhancementKind) -> EnhancementRequest {
        EnhancementRequest {
            user_id: "alice".to_string(),
            kind,
            level: None,
            aura_tag: None,
        }
    }

    fn active_wish() -> WishContext {
        WishContext {
            owner_id: "alice".to_string(),
            status: WishStatus::Active,
            current_level: None,
            current_aura: None,
        }
    }

    #[test]
    fn first_priority_level_is_valid() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(1);
        let verdict = validate(&req, &active_wish(), Some(40));
        assert!(verdict.is_valid);
        assert!(verdict.can_apply);
        assert_eq!(verdict.cost, Some(10));
        assert!(verdict.errors.is_empty());
    }

    #[test]
    fn level_must_exceed_current() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(2);
        let mut wish = active_wish();
        wish.current_level = Some(2);
        let verdict = validate(&req, &wish, None);
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].contains("exceed the current level"));
        assert_eq!(verdict.current_level, Some(2));
    }

    #[test]
    fn downgrade_is_rejected() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(1);
        let mut wish = active_wish();
        wish.current_level = Some(3);
        let verdict = validate(&req, &wish, None);
        assert!(!verdict.is_valid);
    }

    #[test]
    fn level_five_is_terminal() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(5);
        let mut wish = active_wish();
        wish.current_level = Some(5);
        let verdict = validate(&req, &wish, None);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors, vec!["maximum priority level reached"]);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(6);
        let verdict = validate(&req, &active_wish(), None);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.cost, None);
    }

    #[test]
    fn duplicate_aura_is_rejected() {
        let mut req = request(EnhancementKind::Aura);
        req.aura_tag = Some(AuraTag::Gaming);
        let mut wish = active_wish();
        wish.current_aura = Some(AuraTag::Romantic);
        let verdict = validate(&req, &wish, Some(100));
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].contains("already has the romantic aura"));
    }

    #[test]
    fn non_owner_is_rejected() {
        let mut req = request(EnhancementKind::Aura);
        req.user_id = "mallory".to_string();
        req.aura_tag = Some(AuraTag::Cozy);
        let verdict = validate(&req, &active_wish(), None);
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].contains("wish owner"));
    }

    #[test]
    fn inactive_wish_is_rejected() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(1);
        let mut wish = active_wish();
        wish.status = WishStatus::Completed;
        let verdict = validate(&req, &wish, None);
        assert!(!verdict.is_valid);
        assert!(verdict.errors[0].contains("completed"));
    }

    #[test]
    fn short_balance_blocks_apply_but_keeps_rules_valid() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(3);
        let verdict = validate(&req, &active_wish(), Some(30));
        assert!(verdict.is_valid);
        assert!(!verdict.can_apply);
        assert_eq!(verdict.cost, Some(50));
        assert!(verdict.errors[0].contains("required 50, available 30"));
    }

    #[test]
    fn missing_balance_skips_the_advisory_check() {
        let mut req = request(EnhancementKind::Priority);
        req.level = Some(3);
        let verdict = validate(&req, &active_wish(), None);
        assert!(verdict.is_valid);
        assert!(verdict.can_apply);
    }
}

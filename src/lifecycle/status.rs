//! RFQ status transitions and guards.
//!
//! Status moves in one direction only. `Awarded` and `Rejected` come
//! from the buying side via reload; the functions here cover every
//! transition a bidder can trigger.

use chrono::{DateTime, Utc};

use crate::domain::RfqStatus;
use crate::error::ApiError;

pub const STATUS_GUARD_MSG: &str = "This action is not allowed for the current RFQ status";
pub const INVITATION_DEADLINE_MSG: &str = "Cannot accept or reject after the deadline has passed";
pub const REJECT_REASON_MSG: &str = "A reason is required to reject this RFQ";

/// Wire actions for the remote set-status function call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Accept,
    Reject,
}

impl StatusAction {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

/// Guard for accepting an invitation. Only a pending RFQ whose
/// deadline has not passed may be accepted.
pub fn accept(
    current: RfqStatus,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<RfqStatus, ApiError> {
    if current != RfqStatus::Pending {
        return Err(ApiError::conflict(STATUS_GUARD_MSG));
    }
    if now >= deadline {
        return Err(ApiError::deadline_passed(INVITATION_DEADLINE_MSG));
    }
    Ok(RfqStatus::Accepted)
}

/// Guard for rejecting an invitation. Same window as accept, plus a
/// non-empty reason.
pub fn reject(
    current: RfqStatus,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
    reason: &str,
) -> Result<RfqStatus, ApiError> {
    if current != RfqStatus::Pending {
        return Err(ApiError::conflict(STATUS_GUARD_MSG));
    }
    if now >= deadline {
        return Err(ApiError::deadline_passed(INVITATION_DEADLINE_MSG));
    }
    if reason.trim().is_empty() {
        return Err(ApiError::bad_request(REJECT_REASON_MSG));
    }
    Ok(RfqStatus::NotAccepted)
}

/// Guard for the final submit. Reachable from an accepted RFQ or from
/// a saved draft.
pub fn submit(current: RfqStatus) -> Result<RfqStatus, ApiError> {
    match current {
        RfqStatus::Accepted | RfqStatus::Draft => Ok(RfqStatus::Submitted),
        _ => Err(ApiError::conflict(STATUS_GUARD_MSG)),
    }
}

/// Guard for saving a draft. Creates the draft record from `Accepted`
/// or refreshes an existing one.
pub fn draft(current: RfqStatus) -> Result<RfqStatus, ApiError> {
    match current {
        RfqStatus::Accepted | RfqStatus::Draft => Ok(RfqStatus::Draft),
        _ => Err(ApiError::conflict(STATUS_GUARD_MSG)),
    }
}

/// Revision sub-flows never change the status; they are only offered
/// once a quotation exists.
pub fn can_revise(current: RfqStatus) -> bool {
    matches!(current, RfqStatus::Submitted | RfqStatus::Draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn deadline_in(hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now + Duration::hours(hours), now)
    }

    #[test]
    fn accept_from_pending_before_deadline() {
        let (deadline, now) = deadline_in(24);
        assert_eq!(
            accept(RfqStatus::Pending, deadline, now).ok(),
            Some(RfqStatus::Accepted)
        );
    }

    #[test]
    fn accept_is_rejected_when_already_accepted() {
        let (deadline, now) = deadline_in(24);
        let err = accept(RfqStatus::Accepted, deadline, now).err();
        assert!(matches!(err, Some(ApiError::Conflict(_))));
    }

    #[test]
    fn accept_after_deadline_is_a_deadline_error() {
        let (deadline, now) = deadline_in(-1);
        let err = accept(RfqStatus::Pending, deadline, now).err();
        assert!(matches!(err, Some(ApiError::DeadlinePassed(_))));
    }

    #[test]
    fn reject_requires_a_reason() {
        let (deadline, now) = deadline_in(24);
        let err = reject(RfqStatus::Pending, deadline, now, "  ").err();
        assert!(matches!(err, Some(ApiError::BadRequest(_))));
        assert_eq!(
            reject(RfqStatus::Pending, deadline, now, "price not workable").ok(),
            Some(RfqStatus::NotAccepted)
        );
    }

    #[test]
    fn submit_only_from_accepted_or_draft() {
        assert_eq!(submit(RfqStatus::Accepted).ok(), Some(RfqStatus::Submitted));
        assert_eq!(submit(RfqStatus::Draft).ok(), Some(RfqStatus::Submitted));
        assert!(submit(RfqStatus::Submitted).is_err());
        assert!(submit(RfqStatus::Pending).is_err());
    }

    #[test]
    fn revision_is_offered_only_after_a_quotation_exists() {
        assert!(can_revise(RfqStatus::Submitted));
        assert!(can_revise(RfqStatus::Draft));
        assert!(!can_revise(RfqStatus::Accepted));
        assert!(!can_revise(RfqStatus::Awarded));
    }
}

//! Per-view session store.
//!
//! Holds the transient, session-scoped side of the lifecycle: the
//! submission sub-state, the in-progress quotation model (work items,
//! charges, additional attachments), the busy flag, and the countdown
//! task. Keyed by `(rfq_number, bidder)`; keys are disjoint across
//! bidders so there is no cross-bidder locking.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{
    AdditionalAttachment, Charge, ReviseTarget, Submission, SubmissionState, WorkItem,
};
use crate::error::ApiError;

use super::countdown::{Countdown, CountdownHandle};

pub const BUSY_MSG: &str = "Another request is already in progress for this RFQ";

pub type SessionKey = (String, String);

#[derive(Debug, Default)]
struct SessionEntry {
    state: SubmissionState,
    edit_target: Option<ReviseTarget>,
    busy: bool,
    work_items: Vec<WorkItem>,
    charges: Vec<Charge>,
    additional_attachments: Vec<AdditionalAttachment>,
    countdown: Option<CountdownHandle>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionKey, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any previous session for this key with a freshly
    /// loaded one. The old countdown task, if any, is aborted by the
    /// drop of its handle.
    pub fn reset(
        &self,
        key: &SessionKey,
        work_items: Vec<WorkItem>,
        charges: Vec<Charge>,
        additional_attachments: Vec<AdditionalAttachment>,
        countdown: Option<CountdownHandle>,
    ) {
        let mut sessions = self.inner.write();
        sessions.insert(
            key.clone(),
            SessionEntry {
                state: SubmissionState::Creating,
                edit_target: None,
                busy: false,
                work_items,
                charges,
                additional_attachments,
                countdown,
            },
        );
    }

    /// View teardown: drop the session entirely.
    pub fn teardown(&self, key: &SessionKey) {
        self.inner.write().remove(key);
    }

    pub fn has_session(&self, key: &SessionKey) -> bool {
        self.inner.read().contains_key(key)
    }

    pub fn submission(&self, key: &SessionKey) -> Submission {
        let sessions = self.inner.read();
        match sessions.get(key) {
            Some(entry) => Submission {
                state: entry.state,
                is_submitting: entry.busy,
            },
            None => Submission::default(),
        }
    }

    pub fn edit_target(&self, key: &SessionKey) -> Option<ReviseTarget> {
        self.inner.read().get(key).and_then(|e| e.edit_target)
    }

    pub fn set_state(&self, key: &SessionKey, state: SubmissionState) {
        let mut sessions = self.inner.write();
        sessions.entry(key.clone()).or_default().state = state;
    }

    pub fn set_edit_target(&self, key: &SessionKey, target: Option<ReviseTarget>) {
        let mut sessions = self.inner.write();
        sessions.entry(key.clone()).or_default().edit_target = target;
    }

    pub fn countdown(&self, key: &SessionKey) -> Option<Countdown> {
        self.inner
            .read()
            .get(key)
            .and_then(|e| e.countdown.as_ref())
            .map(|h| h.latest())
    }

    pub fn work_items(&self, key: &SessionKey) -> Option<Vec<WorkItem>> {
        self.inner.read().get(key).map(|e| e.work_items.clone())
    }

    pub fn set_work_items(&self, key: &SessionKey, items: Vec<WorkItem>) {
        let mut sessions = self.inner.write();
        sessions.entry(key.clone()).or_default().work_items = items;
    }

    /// Mutate one work item in place. Returns the updated line, or
    /// `None` when the session or the item is unknown.
    pub fn update_work_item(
        &self,
        key: &SessionKey,
        item_number: &str,
        apply: impl FnOnce(&mut WorkItem),
    ) -> Option<WorkItem> {
        let mut sessions = self.inner.write();
        let entry = sessions.get_mut(key)?;
        let item = entry
            .work_items
            .iter_mut()
            .find(|i| i.item_number == item_number)?;
        apply(item);
        Some(item.clone())
    }

    pub fn charges(&self, key: &SessionKey) -> Vec<Charge> {
        self.inner
            .read()
            .get(key)
            .map(|e| e.charges.clone())
            .unwrap_or_default()
    }

    pub fn add_charge(&self, key: &SessionKey, charge: Charge) -> Vec<Charge> {
        let mut sessions = self.inner.write();
        let entry = sessions.entry(key.clone()).or_default();
        entry.charges.push(charge);
        entry.charges.clone()
    }

    /// Remove charges by position, highest index first so earlier
    /// removals do not shift later ones.
    pub fn remove_charges(&self, key: &SessionKey, indices: &[usize]) -> Vec<Charge> {
        let mut sessions = self.inner.write();
        let entry = sessions.entry(key.clone()).or_default();
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < entry.charges.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        for index in sorted.into_iter().rev() {
            entry.charges.remove(index);
        }
        entry.charges.clone()
    }

    pub fn additional_attachments(&self, key: &SessionKey) -> Vec<AdditionalAttachment> {
        self.inner
            .read()
            .get(key)
            .map(|e| e.additional_attachments.clone())
            .unwrap_or_default()
    }

    pub fn add_additional_attachment(
        &self,
        key: &SessionKey,
        attachment: AdditionalAttachment,
    ) -> Vec<AdditionalAttachment> {
        let mut sessions = self.inner.write();
        let entry = sessions.entry(key.clone()).or_default();
        entry.additional_attachments.push(attachment);
        entry.additional_attachments.clone()
    }

    pub fn remove_additional_attachment(
        &self,
        key: &SessionKey,
        index: usize,
    ) -> Result<Vec<AdditionalAttachment>, ApiError> {
        let mut sessions = self.inner.write();
        let entry = sessions.entry(key.clone()).or_default();
        if index >= entry.additional_attachments.len() {
            return Err(ApiError::not_found("Attachment not found"));
        }
        entry.additional_attachments.remove(index);
        Ok(entry.additional_attachments.clone())
    }

    /// Mark this key busy for the duration of a mutating request. A
    /// second concurrent mutation for the same key is rejected. The
    /// returned guard clears the flag on every exit path.
    pub fn begin_mutation(&self, key: &SessionKey) -> Result<BusyGuard, ApiError> {
        let mut sessions = self.inner.write();
        let entry = sessions.entry(key.clone()).or_default();
        if entry.busy {
            return Err(ApiError::conflict(BUSY_MSG));
        }
        entry.busy = true;
        Ok(BusyGuard {
            store: self.clone(),
            key: key.clone(),
        })
    }
}

pub struct BusyGuard {
    store: SessionStore,
    key: SessionKey,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut sessions = self.store.inner.write();
        if let Some(entry) = sessions.get_mut(&self.key) {
            entry.busy = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionKey {
        ("4500000001".to_string(), "0000100001".to_string())
    }

    #[test]
    fn unknown_key_reports_the_default_submission() {
        let store = SessionStore::new();
        let submission = store.submission(&key());
        assert_eq!(submission.state, SubmissionState::Creating);
        assert!(!submission.is_submitting);
    }

    #[test]
    fn duplicate_mutation_is_rejected_until_the_guard_drops() {
        let store = SessionStore::new();
        let guard = store.begin_mutation(&key()).expect("first mutation");
        assert!(store.submission(&key()).is_submitting);
        assert!(matches!(
            store.begin_mutation(&key()),
            Err(ApiError::Conflict(_))
        ));
        drop(guard);
        assert!(!store.submission(&key()).is_submitting);
        store.begin_mutation(&key()).expect("after guard drop");
    }

    #[test]
    fn busy_flag_clears_even_when_the_request_errors_out() {
        let store = SessionStore::new();
        let result: Result<(), ApiError> = (|| {
            let _guard = store.begin_mutation(&key())?;
            Err(ApiError::upstream("remote save failed"))
        })();
        assert!(result.is_err());
        assert!(!store.submission(&key()).is_submitting);
    }

    #[test]
    fn distinct_keys_do_not_contend() {
        let store = SessionStore::new();
        let other = ("4500000002".to_string(), "0000100001".to_string());
        let _a = store.begin_mutation(&key()).expect("first key");
        store.begin_mutation(&other).expect("second key");
    }

    #[test]
    fn reset_returns_the_sub_state_to_creating() {
        let store = SessionStore::new();
        store.set_state(&key(), SubmissionState::Preview);
        store.set_edit_target(&key(), Some(ReviseTarget::Quotation));
        store.reset(&key(), vec![], vec![], vec![], None);
        assert_eq!(store.submission(&key()).state, SubmissionState::Creating);
        assert_eq!(store.edit_target(&key()), None);
    }

    #[test]
    fn teardown_drops_the_session() {
        let store = SessionStore::new();
        store.set_state(&key(), SubmissionState::Editing);
        assert!(store.has_session(&key()));
        store.teardown(&key());
        assert!(!store.has_session(&key()));
        assert_eq!(store.submission(&key()).state, SubmissionState::Creating);
    }

    #[test]
    fn charge_removal_handles_unsorted_and_stale_indices() {
        let store = SessionStore::new();
        for name in ["Freight", "Packing", "Insurance"] {
            store.add_charge(
                &key(),
                Charge {
                    name: name.to_string(),
                    price: rust_decimal::Decimal::from(10),
                    unit: "INR".to_string(),
                },
            );
        }
        let remaining = store.remove_charges(&key(), &[2, 0, 9]);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Packing");
    }
}

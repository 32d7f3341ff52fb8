use crate::{
    data::student::{Student, StudentId},
    error::{MissingStudentSnafu, RosterResult},
    form::FormSession,
    notify::NotificationSink,
    store::RecordStore,
};
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const ERROR_TITLE: &str = "There was an error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Loading,
    Ready,
}

/// Issued for every refresh and every form session. A response carrying a token that is no
/// longer current gets dropped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionToken(u64);

impl SessionToken {
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(value: bool) -> Self {
        if value { Self::Accepted } else { Self::Declined }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Create,
    Edit(StudentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Empty,
    Listing,
    FormOpen(FormKey),
}

#[derive(Debug, Default)]
pub struct PageState {
    pub(crate) records: Vec<Student>,
    pub(crate) status: FetchStatus,
    pub(crate) form: Option<FormSession>,
    last_token: u64,
    latest_refresh: Option<SessionToken>,
}

impl PageState {
    pub(crate) fn issue_token(&mut self) -> SessionToken {
        self.last_token += 1;
        SessionToken(self.last_token)
    }

    /// The open form session, but only if it is the one `token` was issued for.
    pub(crate) fn form_for(&mut self, token: SessionToken) -> Option<&mut FormSession> {
        self.form.as_mut().filter(|session| session.token == token)
    }
}

/// A snapshot of the page, detached from the lock so it can be rendered.
#[derive(Debug, Clone)]
pub struct PageView {
    pub records: Vec<Student>,
    pub status: FetchStatus,
    pub form: Option<FormSession>,
}

impl PageView {
    pub fn phase(&self) -> Phase {
        if self.status == FetchStatus::Loading {
            return Phase::Loading;
        }

        match &self.form {
            Some(session) => Phase::FormOpen(session.key()),
            None if self.records.is_empty() => Phase::Empty,
            None => Phase::Listing,
        }
    }
}

/// The student list page: a cache of the remote collection, plus at most one open form.
pub struct Roster {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) state: Mutex<PageState>,
}

impl Roster {
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            state: Mutex::new(PageState::default()),
        }
    }

    pub async fn view(&self) -> PageView {
        let state = self.state.lock().await;
        PageView {
            records: state.records.clone(),
            status: state.status,
            form: state.form.clone(),
        }
    }

    pub async fn find(&self, id: StudentId) -> RosterResult<Student> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .find(|student| student.id == id)
            .cloned()
            .context(MissingStudentSnafu { id })
    }

    /// Replaces the cached list with whatever the store currently holds. An open form is left
    /// alone.
    pub async fn refresh(&self) {
        let token = {
            let mut state = self.state.lock().await;
            let token = state.issue_token();
            state.latest_refresh = Some(token);
            token
        };

        let result = self.store.list().await;

        let mut state = self.state.lock().await;
        if state.latest_refresh != Some(token) {
            debug!(?token, "Discarding superseded student list");
            return;
        }

        match result {
            Ok(records) => {
                debug!(count = records.len(), "Refreshed students");
                state.records = records;
            }
            Err(e) => {
                error!(?e, "Error listing students");
                self.sink.error(ERROR_TITLE, &e.notification_summary());
            }
        }
        state.status = FetchStatus::Ready;
    }

    /// A failed delete leaves the cache as it was; the user can refresh by repeating a gesture.
    pub async fn request_delete(&self, id: StudentId, confirmation: Confirmation) -> DeleteOutcome {
        if confirmation == Confirmation::Declined {
            debug!(%id, "Delete declined");
            return DeleteOutcome::Declined;
        }

        match self.store.delete(id).await {
            Ok(()) => {
                self.sink
                    .success("Student deleted", &format!("Student with {id} was deleted"));
                self.refresh().await;
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!(?e, %id, "Error deleting student");
                self.sink.error(ERROR_TITLE, &e.notification_summary());
                DeleteOutcome::Failed
            }
        }
    }

    pub async fn request_edit(&self, id: StudentId) -> RosterResult<SessionToken> {
        let mut state = self.state.lock().await;
        let student = state
            .records
            .iter()
            .find(|student| student.id == id)
            .cloned()
            .context(MissingStudentSnafu { id })?;

        let token = state.issue_token();
        state.form = Some(FormSession::edit(token, student));
        Ok(token)
    }

    pub async fn request_create(&self) -> SessionToken {
        let mut state = self.state.lock().await;
        let token = state.issue_token();
        state.form = Some(FormSession::create(token));
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::student::Gender,
        notify::NotificationKind,
        testing::{Call, Failure, MemoryStore, RecordingSink, student},
    };

    fn roster(store: &Arc<MemoryStore>, sink: &Arc<RecordingSink>) -> Roster {
        Roster::new(store.clone(), sink.clone())
    }

    #[tokio::test]
    async fn starts_loading_then_lists_in_server_order() {
        let store = Arc::new(MemoryStore::with(vec![
            student(3, "Cy", Gender::Other),
            student(1, "Ann Lee", Gender::Female),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);

        assert_eq!(roster.view().await.phase(), Phase::Loading);

        roster.refresh().await;

        let view = roster.view().await;
        assert_eq!(view.phase(), Phase::Listing);
        assert_eq!(view.records, store.snapshot());
    }

    #[tokio::test]
    async fn empty_collection_is_empty_phase() {
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);

        roster.refresh().await;
        assert_eq!(roster.view().await.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn failed_refresh_still_finishes_loading() {
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);

        store.fail_next(Failure::Unreadable);
        roster.refresh().await;

        assert_eq!(roster.view().await.status, FetchStatus::Ready);
        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(notifications[0].body, crate::error::GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn superseded_refresh_is_discarded() {
        let store = Arc::new(MemoryStore::with(vec![student(1, "Ann Lee", Gender::Female)]));
        let sink = Arc::new(RecordingSink::default());
        let roster = Arc::new(roster(&store, &sink));

        let release = store.hold_next_list();
        let slow = tokio::spawn({
            let roster = roster.clone();
            async move { roster.refresh().await }
        });
        store.wait_for_calls(1).await;

        roster.refresh().await;
        release.send(vec![student(9, "Stale", Gender::Male)]).unwrap();
        slow.await.unwrap();

        let ids: Vec<_> = roster.view().await.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![StudentId(1)]);
    }

    #[tokio::test]
    async fn declined_delete_makes_no_call() {
        let store = Arc::new(MemoryStore::with(vec![student(1, "Ann Lee", Gender::Female)]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);

        let outcome = roster.request_delete(StudentId(1), Confirmation::Declined).await;

        assert_eq!(outcome, DeleteOutcome::Declined);
        assert!(store.calls().is_empty());
        assert!(sink.notifications().is_empty());
    }

    #[tokio::test]
    async fn accepted_delete_notifies_then_refreshes() {
        let store = Arc::new(MemoryStore::with(vec![
            student(1, "Ann Lee", Gender::Female),
            student(2, "Bo", Gender::Male),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        let outcome = roster.request_delete(StudentId(1), Confirmation::Accepted).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(
            store.calls(),
            vec![Call::List, Call::Delete(StudentId(1)), Call::List]
        );
        assert_eq!(sink.notifications()[0].body, "Student with 1 was deleted");
        let ids: Vec<_> = roster.view().await.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![StudentId(2)]);
    }

    #[tokio::test]
    async fn failed_delete_does_not_refresh() {
        let store = Arc::new(MemoryStore::with(vec![student(1, "Ann Lee", Gender::Female)]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        store.fail_next(Failure::rejected("Student with id 1 does not exist", &[]));
        let outcome = roster.request_delete(StudentId(1), Confirmation::Accepted).await;

        assert_eq!(outcome, DeleteOutcome::Failed);
        assert_eq!(store.calls(), vec![Call::List, Call::Delete(StudentId(1))]);
        assert_eq!(
            sink.notifications()[0].body,
            "Student with id 1 does not exist"
        );
        assert_eq!(roster.view().await.records.len(), 1);
    }

    #[tokio::test]
    async fn edit_replaces_staged_record() {
        let store = Arc::new(MemoryStore::with(vec![
            student(1, "Ann Lee", Gender::Female),
            student(2, "Bo", Gender::Male),
        ]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        let first = roster.request_edit(StudentId(1)).await.unwrap();
        let second = roster.request_edit(StudentId(2)).await.unwrap();
        assert_ne!(first, second);

        let view = roster.view().await;
        assert_eq!(view.phase(), Phase::FormOpen(FormKey::Edit(StudentId(2))));
        assert_eq!(view.form.unwrap().fields.name, "Bo");
    }

    #[tokio::test]
    async fn edit_of_unknown_record_fails() {
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        assert!(roster.request_edit(StudentId(5)).await.is_err());
        assert_eq!(roster.view().await.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn refresh_keeps_edit_session_open() {
        let store = Arc::new(MemoryStore::with(vec![student(1, "Ann Lee", Gender::Female)]));
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        roster.request_edit(StudentId(1)).await.unwrap();
        roster.refresh().await;

        assert_eq!(
            roster.view().await.phase(),
            Phase::FormOpen(FormKey::Edit(StudentId(1)))
        );
    }

    #[tokio::test]
    async fn create_opens_blank_form() {
        let store = Arc::new(MemoryStore::default());
        let sink = Arc::new(RecordingSink::default());
        let roster = roster(&store, &sink);
        roster.refresh().await;

        roster.request_create().await;

        let view = roster.view().await;
        assert_eq!(view.phase(), Phase::FormOpen(FormKey::Create));
        assert_eq!(view.form.unwrap().fields, crate::form::DraftFields::default());
    }
}

use crate::{
    config::RuntimeConfiguration,
    error::{InvalidPageSnafu, MissingPageSnafu, RosterError, RosterResult},
    notify::{BroadcastNotifier, Notification},
    page::Roster,
    store::{RecordStore, http::HttpRecordStore},
};
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use maud::{DOCTYPE, Markup, html};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    ops::Deref,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, broadcast::Receiver};
use uuid::Uuid;

/// htmx sends this on every request from a page, via `hx-headers` on the page root.
pub const PAGE_HEADER: &str = "x-roster-page";
/// Pages with no open toast feed are forgotten once they have been quiet this long.
const PAGE_IDLE_LIMIT: Duration = Duration::from_secs(30 * 60);
const TOAST_CAPACITY: usize = 16;

/// One browser tab's worth of page. Minted when `/` is served.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The list page as one tab sees it, plus that tab's toast feed.
pub struct OpenPage {
    roster: Roster,
    notifier: BroadcastNotifier,
}

impl OpenPage {
    fn new(store: Arc<dyn RecordStore>) -> Self {
        let notifier = BroadcastNotifier::new(TOAST_CAPACITY);
        Self {
            roster: Roster::new(store, Arc::new(notifier.clone())),
            notifier,
        }
    }

    pub fn subscribe_to_notifications(&self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }
}

impl Deref for OpenPage {
    type Target = Roster;

    fn deref(&self) -> &Self::Target {
        &self.roster
    }
}

struct TrackedPage {
    page: Arc<OpenPage>,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct RosterState {
    store: Arc<dyn RecordStore>,
    pages: Arc<Mutex<HashMap<PageId, TrackedPage>>>,
    idle_limit: Duration,
}

impl RosterState {
    pub fn new(config: &RuntimeConfiguration) -> RosterResult<Self> {
        let store = HttpRecordStore::new(&config.api_config())?;
        Ok(Self::from_store(Arc::new(store)))
    }

    pub fn from_store(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            pages: Arc::new(Mutex::new(HashMap::new())),
            idle_limit: PAGE_IDLE_LIMIT,
        }
    }

    #[cfg(test)]
    pub fn with_idle_limit(mut self, idle_limit: Duration) -> Self {
        self.idle_limit = idle_limit;
        self
    }

    /// The state for `id`, opened fresh if this is the first we have heard of it (or it was
    /// forgotten after going idle).
    pub async fn page(&self, id: PageId) -> Arc<OpenPage> {
        let now = Instant::now();
        let mut pages = self.pages.lock().await;

        pages.retain(|other, tracked| {
            *other == id
                || tracked.page.notifier.has_subscribers()
                || now.duration_since(tracked.last_seen) < self.idle_limit
        });

        let tracked = pages.entry(id).or_insert_with(|| {
            debug!(%id, "Opening page");
            TrackedPage {
                page: Arc::new(OpenPage::new(self.store.clone())),
                last_seen: now,
            }
        });
        tracked.last_seen = now;
        tracked.page.clone()
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-remove-me@2.0.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Roster" }
                }
                body hx-ext="sse,remove-me" class="bg-gray-900 min-h-screen flex flex-col items-center justify-center text-white" {
                    (markup)
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<PageId>,
}

/// The page a request came from, read from [`PAGE_HEADER`] or, for the toast feed (which
/// cannot set headers), a `page` query parameter.
pub struct CurrentPage(pub Arc<OpenPage>);

impl FromRequestParts<RosterState> for CurrentPage {
    type Rejection = RosterError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &RosterState,
    ) -> Result<Self, Self::Rejection> {
        let id = match parts.headers.get(PAGE_HEADER) {
            Some(raw) => {
                let raw = raw.to_str().unwrap_or_default();
                PageId(raw.parse().context(InvalidPageSnafu { raw })?)
            }
            None => Query::<PageQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(query)| query.page)
                .context(MissingPageSnafu)?,
        };

        Ok(Self(state.page(id).await))
    }
}

impl Deref for CurrentPage {
    type Target = OpenPage;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::student::Gender,
        page::FetchStatus,
        testing::{MemoryStore, student},
    };

    #[tokio::test]
    async fn pages_keep_their_own_state() {
        let state = RosterState::from_store(Arc::new(MemoryStore::with(vec![student(
            7,
            "Ann Lee",
            Gender::Female,
        )])));
        let (a, b) = (PageId::new(), PageId::new());

        state.page(a).await.refresh().await;

        assert_eq!(state.page(a).await.view().await.status, FetchStatus::Ready);
        assert_eq!(state.page(b).await.view().await.status, FetchStatus::Loading);
        assert!(Arc::ptr_eq(&state.page(a).await, &state.page(a).await));
    }

    #[tokio::test]
    async fn idle_pages_are_forgotten_unless_listening() {
        let state = RosterState::from_store(Arc::new(MemoryStore::default()))
            .with_idle_limit(Duration::ZERO);
        let (quiet, listening, other) = (PageId::new(), PageId::new(), PageId::new());

        let quiet_page = state.page(quiet).await;
        let listening_page = state.page(listening).await;
        let _toasts = listening_page.subscribe_to_notifications();

        state.page(other).await;

        assert!(!Arc::ptr_eq(&quiet_page, &state.page(quiet).await));
        assert!(Arc::ptr_eq(&listening_page, &state.page(listening).await));
    }
}

use maud::{Markup, Render, html};
use serde::Serialize;
use tokio::sync::broadcast::{Receiver, Sender, channel};
use uuid::Uuid;

/// How long a toast stays on screen, in the form the htmx `remove-me` extension reads.
pub const TOAST_LIFETIME: &str = "4.5s";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            body: body.into(),
        }
    }
}

impl Render for Notification {
    fn render(&self) -> Markup {
        let colours = match self.kind {
            NotificationKind::Success => "bg-green-100 border-green-400 text-green-800",
            NotificationKind::Error => "bg-red-100 border-red-400 text-red-700",
        };

        html! {
            div id={"toast-" (self.id)} class={"border px-4 py-3 rounded shadow-md mb-2 " (colours)} role="alert" remove-me=(TOAST_LIFETIME) {
                strong class="font-bold block" {(self.title)}
                span {(self.body)}
            }
        }
    }
}

/// Somewhere to show transient success and error messages. Nothing is returned to the caller.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, title: &str, body: &str) {
        self.notify(Notification::new(NotificationKind::Success, title, body));
    }

    fn error(&self, title: &str, body: &str) {
        self.notify(Notification::new(NotificationKind::Error, title, body));
    }
}

/// Fans notifications out to every `/sse_feed` connection for one page.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!(title = %notification.title, body = %notification.body, "Notifying");
            }
            NotificationKind::Error => {
                warn!(title = %notification.title, body = %notification.body, "Notifying");
            }
        }

        //no subscribers just means no open pages
        let _ = self.sender.send(notification);
    }
}

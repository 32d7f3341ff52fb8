use crate::state::CurrentPage;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use maud::Render;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

/// Every notification for the page becomes a `toast` event carrying its rendered markup.
pub async fn sse_feed(page: CurrentPage) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(page.subscribe_to_notifications()).filter_map(
        |notification| match notification {
            Ok(notification) => Some(Ok::<_, Infallible>(
                Event::default()
                    .event("toast")
                    .data(notification.render().into_string()),
            )),
            Err(e) => {
                warn!(?e, "Toast subscriber fell behind");
                None
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}

use crate::state::RollbookState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

///Broadcast to every open page whenever a student is created/updated/deleted,
///so list views refetch without polling.
#[derive(Debug, Copy, Clone)]
pub enum SseEvent {
    CrudStudent,
}

impl SseEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CrudStudent => "crud_student",
        }
    }
}

pub async fn sse_feed(
    State(state): State<RollbookState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_to_sse_feed();

    //lagged receivers just skip - the next crud event triggers a fresh fetch anyway
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .map(|event| Ok(Event::default().event(event.name()).data(event.name())))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

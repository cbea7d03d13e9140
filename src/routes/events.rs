use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    models::AppointmentStatus,
    routes::sse_frame,
    state::{AppState, ServerEvent},
};

/// Registered inside the authenticated `/admin` scope, ahead of
/// `/appointments/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/appointments/events").route(web::get().to(appointment_events)))
        .service(web::resource("/diagnostics/events").route(web::get().to(diagnostic_events)));
}

#[derive(Deserialize)]
struct TabQuery {
    status: Option<AppointmentStatus>,
}

/// Live updates for one moderation tab. The broadcast receiver is owned by
/// the response stream, so the subscription ends when the client goes away.
async fn appointment_events(state: web::Data<AppState>, query: web::Query<TabQuery>) -> HttpResponse {
    let status = query.status.unwrap_or(AppointmentStatus::Pending);
    sse_response(tab_stream(state.events.subscribe(), status))
}

async fn diagnostic_events(state: web::Data<AppState>) -> HttpResponse {
    let stream = BroadcastStream::new(state.diagnostics.subscribe()).filter_map(|result| {
        result
            .ok()
            .map(|event| Ok::<web::Bytes, actix_web::Error>(sse_frame("permission-error", &event)))
    });
    sse_response(stream)
}

pub fn tab_stream(
    rx: broadcast::Receiver<ServerEvent>,
    status: AppointmentStatus,
) -> impl Stream<Item = Result<web::Bytes, actix_web::Error>> {
    BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(event) if event.touches(status) => Some(Ok(sse_frame("update", &event))),
        Ok(_) => None,
        Err(err) => {
            log::debug!("Event subscriber lagged: {err}");
            None
        }
    })
}

fn sse_response<S>(stream: S) -> HttpResponse
where
    S: Stream<Item = Result<web::Bytes, actix_web::Error>> + 'static,
{
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

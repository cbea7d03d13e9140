use serde::Serialize;
use tokio::sync::broadcast;

use crate::{
    db::Store,
    diagnostics::Diagnostics,
    models::{Appointment, AppointmentStatus},
};

pub const EVENT_CREATED: &str = "appointment_created";
pub const EVENT_PROCESSED: &str = "appointment_processed";
pub const EVENT_DELETED: &str = "appointment_deleted";

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub events: broadcast::Sender<ServerEvent>,
    pub diagnostics: Diagnostics,
}

impl AppState {
    pub fn new(store: Store, diagnostics: Diagnostics, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            store,
            events,
            diagnostics,
        }
    }

    pub fn publish(&self, event: ServerEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

/// Change notification for admin list subscriptions.
#[derive(Clone, Debug, Serialize)]
pub struct ServerEvent {
    pub kind: &'static str,
    pub appointment_id: String,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<AppointmentStatus>,
    pub name: String,
    pub service: String,
    pub date: String,
}

impl ServerEvent {
    pub fn from_appointment(kind: &'static str, appointment: &Appointment) -> Self {
        Self {
            kind,
            appointment_id: appointment.id.clone(),
            status: appointment.status,
            previous_status: None,
            name: appointment.name.clone(),
            service: appointment.service.clone(),
            date: appointment.date.to_string(),
        }
    }

    pub fn with_previous(mut self, status: AppointmentStatus) -> Self {
        self.previous_status = Some(status);
        self
    }

    /// Whether a list showing `status` has to react to this event.
    pub fn touches(&self, status: AppointmentStatus) -> bool {
        self.status == status || self.previous_status == Some(status)
    }
}

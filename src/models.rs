use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const PAGE_ABOUT: &str = "about";
pub const PAGE_CONTACT: &str = "contact";

/// Moderation state of a booking. The only allowed transition is
/// `Pending -> Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Processed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!((self, next), (Self::Pending, Self::Processed))
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub image_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub bio: String,
    pub image: String,
    pub image_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GalleryImage {
    pub id: String,
    pub image_url: String,
    pub description: String,
    pub image_hint: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    pub title: String,
    pub subtitle: String,
    pub paragraph1: String,
    pub paragraph2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub hours: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            address: "Jl. Cantik Raya No. 123, Jakarta Selatan, 12345, Indonesia".to_string(),
            phone: "(021) 1234 5678".to_string(),
            email: "info@aurorabeauty.com".to_string(),
            hours: "Senin - Sabtu: 09:00 - 20:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub uid: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub name: &'static str,
    pub rating: u8,
    pub comment: &'static str,
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            name: "Rina S.",
            rating: 5,
            comment: "Pelayanannya luar biasa! Kulit saya jadi jauh lebih cerah dan sehat setelah perawatan di Aurora. Pasti akan kembali lagi!",
        },
        Testimonial {
            name: "Dewi K.",
            rating: 5,
            comment: "Dokter dan stafnya sangat profesional dan ramah. Hasil treatment laser-nya sangat memuaskan. Terima kasih Aurora Beauty Clinic!",
        },
        Testimonial {
            name: "Lina M.",
            rating: 5,
            comment: "Tempatnya nyaman dan mewah. Saya merasa sangat rileks selama perawatan. Recommended banget untuk yang mau me-time!",
        },
    ]
}

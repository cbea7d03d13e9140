//! Typed inputs for every form the site accepts.
//!
//! Raw request bodies deserialize into the `*Input` structs, which are then
//! checked field by field. Every failing field is collected into
//! [`FieldErrors`] so the caller can show all messages at once; only a fully
//! valid input is turned into the typed value handed to the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::{AboutContent, ContactInfo};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub service: Option<String>,
    pub date: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl BookingInput {
    pub fn validate(self) -> Result<NewAppointment, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim().to_string();
        let phone = self.phone.trim().to_string();
        let email = self.email.trim().to_string();
        let service = self.service.as_deref().map(str::trim).unwrap_or_default().to_string();

        min_chars(&mut errors, "name", &name, 2, "Nama harus diisi, minimal 2 karakter.");
        min_chars(&mut errors, "phone", &phone, 10, "Nomor WhatsApp harus valid.");
        if !is_valid_email(&email) {
            errors.add("email", "Format email tidak valid.");
        }
        if service.is_empty() {
            errors.add("service", "Silakan pilih layanan.");
        }
        let date = self.date.as_deref().and_then(parse_date);
        if date.is_none() {
            errors.add("date", "Tanggal konsultasi harus diisi.");
        }

        let note = non_blank(self.note);
        errors.finish(|| NewAppointment {
            name,
            phone,
            email,
            service,
            date: date.unwrap_or_default(),
            note,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl CredentialsInput {
    pub fn validate(self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.add("email", "Format email tidak valid.");
        }
        if self.password.chars().count() < 6 {
            errors.add("password", "Password minimal 6 karakter.");
        }
        errors.finish(|| Credentials {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<PriceValue>,
    #[serde(default)]
    pub image: String,
    pub image_hint: Option<String>,
}

/// Prices arrive as numbers from JSON clients and as strings from HTML forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub image_hint: Option<String>,
}

impl ServiceInput {
    pub fn validate(self) -> Result<NewService, FieldErrors> {
        let mut errors = FieldErrors::default();
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();
        let image = self.image.trim().to_string();

        min_chars(&mut errors, "title", &title, 3, "Judul minimal 3 karakter.");
        min_chars(&mut errors, "description", &description, 10, "Deskripsi minimal 10 karakter.");
        let price = self
            .price
            .as_ref()
            .and_then(PriceValue::as_f64)
            .filter(|price| price.is_finite() && *price > 0.0);
        if price.is_none() {
            errors.add("price", "Harga harus angka positif.");
        }
        image_url(&mut errors, "image", &image);

        errors.finish(|| NewService {
            title,
            description,
            price: price.unwrap_or_default(),
            image,
            image_hint: non_blank(self.image_hint),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
    pub image_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub bio: String,
    pub image: String,
    pub image_hint: Option<String>,
}

impl DoctorInput {
    pub fn validate(self) -> Result<NewDoctor, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim().to_string();
        let specialty = self.specialty.trim().to_string();
        let bio = self.bio.trim().to_string();
        let image = self.image.trim().to_string();

        min_chars(&mut errors, "name", &name, 3, "Nama minimal 3 karakter.");
        min_chars(&mut errors, "specialty", &specialty, 5, "Spesialisasi minimal 5 karakter.");
        min_chars(&mut errors, "bio", &bio, 20, "Bio minimal 20 karakter.");
        image_url(&mut errors, "image", &image);

        errors.finish(|| NewDoctor {
            name,
            specialty,
            bio,
            image,
            image_hint: non_blank(self.image_hint),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryInput {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    pub image_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGalleryImage {
    pub image_url: String,
    pub description: String,
    pub image_hint: Option<String>,
}

impl GalleryInput {
    pub fn validate(self) -> Result<NewGalleryImage, FieldErrors> {
        let mut errors = FieldErrors::default();
        let image_url_value = self.image_url.trim().to_string();
        let description = self.description.trim().to_string();

        image_url(&mut errors, "image_url", &image_url_value);
        min_chars(&mut errors, "description", &description, 3, "Deskripsi minimal 3 karakter.");

        errors.finish(|| NewGalleryImage {
            image_url: image_url_value,
            description,
            image_hint: non_blank(self.image_hint),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AboutInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub paragraph1: String,
    #[serde(default)]
    pub paragraph2: String,
}

impl AboutInput {
    pub fn validate(self) -> Result<AboutContent, FieldErrors> {
        let mut errors = FieldErrors::default();
        let content = AboutContent {
            title: self.title.trim().to_string(),
            subtitle: self.subtitle.trim().to_string(),
            paragraph1: self.paragraph1.trim().to_string(),
            paragraph2: self.paragraph2.trim().to_string(),
        };
        min_chars(&mut errors, "title", &content.title, 10, "Judul minimal 10 karakter.");
        min_chars(&mut errors, "subtitle", &content.subtitle, 10, "Subjudul minimal 10 karakter.");
        min_chars(&mut errors, "paragraph1", &content.paragraph1, 20, "Paragraf 1 minimal 20 karakter.");
        min_chars(&mut errors, "paragraph2", &content.paragraph2, 20, "Paragraf 2 minimal 20 karakter.");
        errors.finish(|| content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub hours: String,
}

impl ContactInput {
    pub fn validate(self) -> Result<ContactInfo, FieldErrors> {
        let mut errors = FieldErrors::default();
        let info = ContactInfo {
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            hours: self.hours.trim().to_string(),
        };
        min_chars(&mut errors, "address", &info.address, 10, "Alamat minimal 10 karakter.");
        min_chars(&mut errors, "phone", &info.phone, 10, "Nomor telepon minimal 10 karakter.");
        if !is_valid_email(&info.email) {
            errors.add("email", "Format email tidak valid.");
        }
        min_chars(&mut errors, "hours", &info.hours, 10, "Jam operasional minimal 10 karakter.");
        errors.finish(|| info)
    }
}

fn min_chars(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, message: &str) {
    if value.chars().count() < min {
        errors.add(field, message);
    }
}

fn image_url(errors: &mut FieldErrors, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false);
    if !valid {
        errors.add(field, "URL gambar tidak valid.");
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Accepts a bare calendar date or a full RFC 3339 timestamp, keeping only
/// the date part of the latter.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    labels_ok && tld_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> BookingInput {
        BookingInput {
            name: "Rina".to_string(),
            phone: "081234567890".to_string(),
            email: "rina@x.com".to_string(),
            service: Some("Facial Glow".to_string()),
            date: Some("2025-01-10".to_string()),
            note: None,
        }
    }

    #[test]
    fn valid_booking_passes() {
        let appointment = booking().validate().unwrap();
        assert_eq!(appointment.name, "Rina");
        assert_eq!(appointment.service, "Facial Glow");
        assert_eq!(appointment.date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(appointment.note, None);
    }

    #[test]
    fn booking_reports_every_failing_field() {
        let input = BookingInput {
            name: "R".to_string(),
            phone: "0812".to_string(),
            email: "rina-at-x".to_string(),
            service: None,
            date: Some("   ".to_string()),
            note: Some("kulit sensitif".to_string()),
        };
        let errors = input.validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["date", "email", "name", "phone", "service"]);
        assert_eq!(errors.get("email"), Some("Format email tidak valid."));
    }

    #[test]
    fn booking_accepts_iso_timestamps_and_drops_blank_notes() {
        let mut input = booking();
        input.date = Some("2025-01-10T03:00:00.000Z".to_string());
        input.note = Some("  ".to_string());
        let appointment = input.validate().unwrap();
        assert_eq!(appointment.date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(appointment.note, None);
    }

    #[test]
    fn booking_rejects_unparseable_dates() {
        let mut input = booking();
        input.date = Some("10/01/2025".to_string());
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["date"]);
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("rina@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.id"));
        assert!(!is_valid_email("rina@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("rina@@x.com"));
        assert!(!is_valid_email("ri na@x.com"));
        assert!(!is_valid_email("rina@x..com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn service_price_accepts_form_strings() {
        let input = ServiceInput {
            title: "Facial Glow".to_string(),
            description: "Perawatan wajah untuk kulit cerah.".to_string(),
            price: Some(PriceValue::Text("500000".to_string())),
            image: "https://picsum.photos/seed/facial/400/300".to_string(),
            image_hint: Some("".to_string()),
        };
        let service = input.validate().unwrap();
        assert_eq!(service.price, 500000.0);
        assert_eq!(service.image_hint, None);
    }

    #[test]
    fn service_rejects_non_positive_price_and_bad_url() {
        let input = ServiceInput {
            title: "Facial Glow".to_string(),
            description: "Perawatan wajah untuk kulit cerah.".to_string(),
            price: Some(PriceValue::Number(0.0)),
            image: "not a url".to_string(),
            image_hint: None,
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["image", "price"]);
    }

    #[test]
    fn credentials_require_six_character_password() {
        let input = CredentialsInput {
            email: "Admin@Aurora.com ".to_string(),
            password: "12345".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("password"), Some("Password minimal 6 karakter."));

        let ok = CredentialsInput {
            email: "Admin@Aurora.com ".to_string(),
            password: "123456".to_string(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "admin@aurora.com");
    }

    #[test]
    fn contact_and_about_minimums() {
        let contact = ContactInput {
            address: "Jl. Pendek".to_string(),
            phone: "021".to_string(),
            email: "info@aurorabeauty.com".to_string(),
            hours: "Senin - Sabtu: 09:00 - 20:00".to_string(),
        };
        let errors = contact.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["phone"]);

        let about = AboutInput {
            title: "Tentang Aurora".to_string(),
            subtitle: "Klinik kecantikan".to_string(),
            paragraph1: "terlalu pendek".to_string(),
            paragraph2: "Kami melayani sejak 2010 dengan dokter berpengalaman.".to_string(),
        };
        let errors = about.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["paragraph1"]);
    }
}

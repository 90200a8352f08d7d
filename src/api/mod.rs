pub mod alquran;
pub mod aladhan;
pub mod geocode;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize};
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AyahText, Location, PrayerTimeSet, SurahInfo};

pub use aladhan::AladhanClient;
pub use alquran::AlQuranClient;
pub use geocode::BigDataCloudClient;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("service returned code {0}")]
    Code(i64),
    #[error("malformed response: {0}")]
    Json(String),
    #[error("no result")]
    Empty,
}

// ─── Service ports ───────────────────────────────────────────────────────────

/// Prayer-time calculation for one day at one place.
pub trait PrayerTimesSource: Send + Sync {
    fn day_times(&self, date: NaiveDate, location: &Location) -> Result<PrayerTimeSet, ApiError>;
}

/// Chapter metadata and verse text.
pub trait VerseSource: Send + Sync {
    fn surah(&self, number: u16) -> Result<SurahInfo, ApiError>;
    /// `edition` of `None` returns the Arabic source text.
    fn ayah(&self, surah: u16, ayah: u16, edition: Option<&str>) -> Result<AyahText, ApiError>;
}

/// Gregorian to Hijri conversion, formatted for display.
pub trait HijriSource: Send + Sync {
    fn hijri_date(&self, date: NaiveDate) -> Result<String, ApiError>;
}

/// Free-text place to coordinates.
pub trait AddressLookup: Send + Sync {
    fn coordinates_for(&self, address: &str) -> Result<(f64, f64), ApiError>;
}

/// Coordinates to a human-readable place.
pub trait PlaceNamer: Send + Sync {
    fn place_name(&self, lat: f64, lng: f64) -> Result<String, ApiError>;
}

// ─── HTTP plumbing ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(timeout_secs.min(10)))
            .timeout_read(Duration::from_secs(timeout_secs))
            .timeout_write(Duration::from_secs(timeout_secs))
            .user_agent(concat!("miqat/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    pub fn get_text(&self, url: &str) -> Result<String, ApiError> {
        log::debug!("GET {}", url);
        let resp = self.agent.get(url).call().map_err(classify)?;
        resp.into_string().map_err(|e| ApiError::Http(e.to_string()))
    }

    /// Whole response body, capped at `limit` bytes.
    pub fn get_bytes(&self, url: &str, limit: u64) -> Result<Vec<u8>, ApiError> {
        log::debug!("GET {} (binary)", url);
        let resp = self.agent.get(url).call().map_err(classify)?;
        let mut body = Vec::new();
        resp.into_reader()
            .take(limit)
            .read_to_end(&mut body)
            .map_err(|e| ApiError::Http(e.to_string()))?;
        if body.is_empty() {
            return Err(ApiError::Empty);
        }
        Ok(body)
    }
}

fn classify(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(code, _) => ApiError::Status(code),
        ureq::Error::Transport(t) => {
            let msg = t.to_string();
            if msg.contains("timed out") {
                ApiError::Timeout
            } else {
                ApiError::Http(msg)
            }
        }
    }
}

/// `{code, data}` wrapper used by the prayer-time and verse services. Error
/// envelopes carry a message string in `data`, so it stays untyped until the
/// code is known.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Json(e.to_string()))
}

pub(crate) fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let env: Envelope = parse_json(body)?;
    if env.code != 200 {
        return Err(ApiError::Code(env.code));
    }
    match env.data {
        None | Some(serde_json::Value::Null) => Err(ApiError::Empty),
        Some(data) => serde_json::from_value(data).map_err(|e| ApiError::Json(e.to_string())),
    }
}

pub(crate) fn dmy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        n: u8,
    }

    #[test]
    fn envelope_requires_success_code() {
        let ok: Payload = parse_envelope(r#"{"code":200,"status":"OK","data":{"n":4}}"#).unwrap();
        assert_eq!(ok.n, 4);
        assert!(matches!(
            parse_envelope::<Payload>(r#"{"code":404,"status":"Not Found","data":"x"}"#),
            Err(ApiError::Code(404))
        ));
        assert!(matches!(
            parse_envelope::<Payload>(r#"{"code":200,"data":null}"#),
            Err(ApiError::Empty)
        ));
        assert!(matches!(parse_envelope::<Payload>("<html>"), Err(ApiError::Json(_))));
    }

    #[test]
    fn error_envelope_with_message_reports_the_code() {
        let body = r#"{"code":404,"status":"NOT FOUND","data":"Surah not found"}"#;
        assert!(matches!(parse_envelope::<Payload>(body), Err(ApiError::Code(404))));
        let body = r#"{"code":400,"data":"Unable to geocode address."}"#;
        assert!(matches!(parse_envelope::<Vec<u8>>(body), Err(ApiError::Code(400))));
    }

    #[test]
    fn success_envelope_with_wrong_shape_is_malformed() {
        assert!(matches!(
            parse_envelope::<Payload>(r#"{"code":200,"data":{"m":1}}"#),
            Err(ApiError::Json(_))
        ));
    }
}

use chrono::NaiveDate;
use serde::Deserialize;

use super::{dmy, parse_envelope, AddressLookup, ApiError, HijriSource, HttpClient, PrayerTimesSource};
use crate::models::{Location, PrayerTimeSet, TimeOfDay};

/// Prayer timings, Hijri conversion and address lookup.
pub struct AladhanClient {
    http: HttpClient,
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(http: HttpClient, base_url: &str, method: u8) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            method,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TimingsWire {
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: TimingsWire,
}

pub(crate) fn parse_timings(body: &str) -> Result<PrayerTimeSet, ApiError> {
    let data: TimingsData = parse_envelope(body)?;
    let t = data.timings;
    let parse = |s: &str| TimeOfDay::parse(s).map_err(|e| ApiError::Json(e.to_string()));
    Ok(PrayerTimeSet {
        fajr: parse(&t.fajr)?,
        dhuhr: parse(&t.dhuhr)?,
        asr: parse(&t.asr)?,
        maghrib: parse(&t.maghrib)?,
        isha: parse(&t.isha)?,
    })
}

#[derive(Debug, Deserialize)]
struct HijriMonth {
    en: String,
}

#[derive(Debug, Deserialize)]
struct HijriWire {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Debug, Deserialize)]
struct HijriData {
    hijri: HijriWire,
}

pub(crate) fn parse_hijri(body: &str) -> Result<String, ApiError> {
    let data: HijriData = parse_envelope(body)?;
    let h = data.hijri;
    Ok(format!("{} {} {} AH", h.day, h.month.en, h.year))
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

// The service has answered both with a single object and with a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinatesData {
    One(Coordinates),
    Many(Vec<Coordinates>),
}

pub(crate) fn parse_coordinates(body: &str) -> Result<(f64, f64), ApiError> {
    let data: CoordinatesData = parse_envelope(body)?;
    let first = match data {
        CoordinatesData::One(c) => c,
        CoordinatesData::Many(list) => list.into_iter().next().ok_or(ApiError::Empty)?,
    };
    Ok((first.latitude, first.longitude))
}

impl PrayerTimesSource for AladhanClient {
    fn day_times(&self, date: NaiveDate, location: &Location) -> Result<PrayerTimeSet, ApiError> {
        let url = format!(
            "{}/timings/{}?latitude={}&longitude={}&method={}",
            self.base_url,
            dmy(date),
            location.lat,
            location.lng,
            self.method
        );
        parse_timings(&self.http.get_text(&url)?)
    }
}

impl HijriSource for AladhanClient {
    fn hijri_date(&self, date: NaiveDate) -> Result<String, ApiError> {
        let url = format!("{}/gToH/{}", self.base_url, dmy(date));
        parse_hijri(&self.http.get_text(&url)?)
    }
}

impl AddressLookup for AladhanClient {
    fn coordinates_for(&self, address: &str) -> Result<(f64, f64), ApiError> {
        let url = format!(
            "{}/addressToCoordinates/{}",
            self.base_url,
            urlencoding::encode(address)
        );
        parse_coordinates(&self.http.get_text(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timings_drop_zone_suffixes() {
        let body = r#"{"code":200,"status":"OK","data":{"timings":{
            "Fajr":"05:00 (EET)","Sunrise":"06:20","Dhuhr":"12:15","Asr":"15:45",
            "Sunset":"18:28","Maghrib":"18:30","Isha":"20:00","Imsak":"04:50"},
            "date":{"readable":"01 Jan 2025"}}}"#;
        let set = parse_timings(body).unwrap();
        assert_eq!(set.fajr.to_string(), "05:00");
        assert_eq!(set.isha.minutes(), 1200);
    }

    #[test]
    fn timings_error_code_is_reported() {
        let body = r#"{"code":400,"status":"BAD_REQUEST","data":"Invalid date"}"#;
        assert!(matches!(parse_timings(body), Err(ApiError::Code(400))));
    }

    #[test]
    fn hijri_date_is_formatted() {
        let body = r#"{"code":200,"status":"OK","data":{"hijri":{"date":"12-09-1446",
            "day":"12","month":{"number":9,"en":"Ramaḍān","ar":"رَمَضان"},"year":"1446"},
            "gregorian":{"date":"12-03-2025"}}}"#;
        assert_eq!(parse_hijri(body).unwrap(), "12 Ramaḍān 1446 AH");
    }

    #[test]
    fn coordinates_accept_object_or_list() {
        let one = r#"{"code":200,"data":{"latitude":21.42,"longitude":39.82}}"#;
        assert_eq!(parse_coordinates(one).unwrap(), (21.42, 39.82));
        let many = r#"{"code":200,"data":[{"latitude":1.5,"longitude":2.5}]}"#;
        assert_eq!(parse_coordinates(many).unwrap(), (1.5, 2.5));
        let none = r#"{"code":200,"data":[]}"#;
        assert!(matches!(parse_coordinates(none), Err(ApiError::Empty)));
    }
}

use chrono::NaiveDate;

use crate::api::ApiError;
use crate::media::verse::load_random_verse;
use crate::models::{PrayerSchedule, SurahInfo, Verse};
use crate::platform::{GeoError, Services};
use crate::utils::hijri::hijri_display;

/// A unit of blocking network work requested by the dashboard. Jobs run off
/// the UI thread and come back as a [`JobOutput`].
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Locate,
    Geocode(String),
    FetchSchedule { lat: f64, lng: f64, date: NaiveDate },
    PlaceName { lat: f64, lng: f64 },
    RandomVerse { edition: String },
    ChapterTitle(u16),
    HijriDate(NaiveDate),
}

#[derive(Debug)]
pub enum JobOutput {
    Located(Result<(f64, f64), GeoError>),
    Geocoded {
        query: String,
        result: Result<(f64, f64), ApiError>,
    },
    Schedule {
        lat: f64,
        lng: f64,
        result: Result<PrayerSchedule, ApiError>,
    },
    PlaceName {
        lat: f64,
        lng: f64,
        result: Result<String, ApiError>,
    },
    Verse(Verse),
    ChapterTitle {
        chapter: u16,
        result: Result<SurahInfo, ApiError>,
    },
    HijriDate(String),
}

impl Job {
    pub fn run(self, services: &Services) -> JobOutput {
        log::debug!("Running {:?}", self);
        match self {
            Job::Locate => JobOutput::Located(services.geolocator.locate()),
            Job::Geocode(query) => {
                let result = services.address_lookup.coordinates_for(&query);
                JobOutput::Geocoded { query, result }
            }
            Job::FetchSchedule { lat, lng, date } => JobOutput::Schedule {
                lat,
                lng,
                result: fetch_schedule(services, lat, lng, date),
            },
            Job::PlaceName { lat, lng } => JobOutput::PlaceName {
                lat,
                lng,
                result: services.place_namer.place_name(lat, lng),
            },
            Job::RandomVerse { edition } => JobOutput::Verse(load_random_verse(
                services.verses.as_ref(),
                &mut rand::thread_rng(),
                &edition,
            )),
            Job::ChapterTitle(chapter) => JobOutput::ChapterTitle {
                chapter,
                result: services.verses.surah(chapter),
            },
            Job::HijriDate(date) => JobOutput::HijriDate(hijri_display(
                services.hijri.as_ref(),
                date,
                services.hijri_offset,
            )),
        }
    }
}

/// Today's and tomorrow's times in one go; either failing fails both.
fn fetch_schedule(
    services: &Services,
    lat: f64,
    lng: f64,
    date: NaiveDate,
) -> Result<PrayerSchedule, ApiError> {
    let location = crate::models::Location::new(lat, lng);
    let tomorrow_date = date.succ_opt().ok_or(ApiError::Empty)?;
    let today = services.prayer_times.day_times(date, &location)?;
    let tomorrow = services.prayer_times.day_times(tomorrow_date, &location)?;
    Ok(PrayerSchedule {
        date,
        today,
        tomorrow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_times, test_date, FakeApi};

    #[test]
    fn schedule_job_fetches_today_and_tomorrow() {
        let services = FakeApi {
            times: Some(sample_times()),
            ..FakeApi::default()
        }
        .into_services();

        let output = Job::FetchSchedule {
            lat: 21.42,
            lng: 39.83,
            date: test_date(),
        }
        .run(&services);

        match output {
            JobOutput::Schedule { lat, result, .. } => {
                assert_eq!(lat, 21.42);
                let schedule = result.unwrap();
                assert_eq!(schedule.date, test_date());
                assert_eq!(schedule.today, sample_times());
                assert_eq!(schedule.tomorrow, sample_times());
            }
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn schedule_job_reports_service_failure() {
        let services = FakeApi::default().into_services();
        let output = Job::FetchSchedule {
            lat: 0.0,
            lng: 0.0,
            date: test_date(),
        }
        .run(&services);
        assert!(matches!(output, JobOutput::Schedule { result: Err(_), .. }));
    }

    #[test]
    fn hijri_job_prefers_the_date_service() {
        let services = FakeApi {
            hijri: Some("1 Ramadan 1446 AH".to_string()),
            ..FakeApi::default()
        }
        .into_services();
        match Job::HijriDate(test_date()).run(&services) {
            JobOutput::HijriDate(text) => assert_eq!(text, "1 Ramadan 1446 AH"),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn locate_job_carries_the_geolocation_error() {
        let services = FakeApi {
            geo_error: Some(GeoError::Denied),
            ..FakeApi::default()
        }
        .into_services();
        assert!(matches!(
            Job::Locate.run(&services),
            JobOutput::Located(Err(GeoError::Denied))
        ));
    }
}

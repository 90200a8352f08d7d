use serde::Deserialize;

use super::{parse_json, ApiError, HttpClient, PlaceNamer};

/// Reverse geocoding. Called without coordinates the same endpoint resolves
/// the caller's IP address, which backs automatic location detection.
pub struct BigDataCloudClient {
    http: HttpClient,
    base_url: String,
}

impl BigDataCloudClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Approximate position of this machine.
    pub fn locate_by_ip(&self) -> Result<(f64, f64), ApiError> {
        let url = format!("{}/reverse-geocode-client?localityLanguage=en", self.base_url);
        let r: ReverseWire = parse_json(&self.http.get_text(&url)?)?;
        match (r.latitude, r.longitude) {
            (Some(lat), Some(lng)) => Ok((lat, lng)),
            _ => Err(ApiError::Empty),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReverseWire {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// "City, Country", then "Locality, Country", then "Country".
pub(crate) fn place_label(r: &ReverseWire) -> Option<String> {
    let country = non_empty(&r.country_name)?;
    if let Some(city) = non_empty(&r.city) {
        return Some(format!("{}, {}", city, country));
    }
    if let Some(locality) = non_empty(&r.locality) {
        return Some(format!("{}, {}", locality, country));
    }
    Some(country.to_string())
}

impl PlaceNamer for BigDataCloudClient {
    fn place_name(&self, lat: f64, lng: f64) -> Result<String, ApiError> {
        let url = format!(
            "{}/reverse-geocode-client?latitude={}&longitude={}&localityLanguage=en",
            self.base_url, lat, lng
        );
        let r: ReverseWire = parse_json(&self.http.get_text(&url)?)?;
        place_label(&r).ok_or(ApiError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(body: &str) -> ReverseWire {
        parse_json(body).unwrap()
    }

    #[test]
    fn label_prefers_city_then_locality_then_country() {
        let full = wire(r#"{"city":"Lahore","locality":"Gulberg","countryName":"Pakistan"}"#);
        assert_eq!(place_label(&full).as_deref(), Some("Lahore, Pakistan"));

        let locality = wire(r#"{"city":"","locality":"Gulberg","countryName":"Pakistan"}"#);
        assert_eq!(place_label(&locality).as_deref(), Some("Gulberg, Pakistan"));

        let country = wire(r#"{"countryName":"Pakistan"}"#);
        assert_eq!(place_label(&country).as_deref(), Some("Pakistan"));

        assert_eq!(place_label(&wire("{}")), None);
    }
}

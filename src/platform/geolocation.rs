use thiserror::Error;

use crate::api::{ApiError, BigDataCloudClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("geolocation unsupported")]
    Unsupported,
}

impl GeoError {
    pub fn user_message(self) -> &'static str {
        match self {
            GeoError::Denied => {
                "Location access denied. Please allow location access or use manual detection."
            }
            GeoError::Unavailable => {
                "Location information unavailable. Please try manual detection."
            }
            GeoError::Timeout => {
                "Location request timed out. Please try again or use manual detection."
            }
            GeoError::Unsupported => {
                "Geolocation is not supported on this system. Please use manual detection."
            }
        }
    }
}

/// Automatic position lookup.
pub trait Geolocator: Send + Sync {
    fn locate(&self) -> Result<(f64, f64), GeoError>;
}

/// Resolves the position from the machine's public IP address.
pub struct IpGeolocator {
    client: BigDataCloudClient,
}

impl IpGeolocator {
    pub fn new(client: BigDataCloudClient) -> Self {
        Self { client }
    }
}

impl Geolocator for IpGeolocator {
    fn locate(&self) -> Result<(f64, f64), GeoError> {
        self.client.locate_by_ip().map_err(|e| {
            log::warn!("IP geolocation failed: {}", e);
            match e {
                ApiError::Timeout => GeoError::Timeout,
                _ => GeoError::Unavailable,
            }
        })
    }
}

/// The user turned automatic detection off.
pub struct DeniedGeolocator;

impl Geolocator for DeniedGeolocator {
    fn locate(&self) -> Result<(f64, f64), GeoError> {
        Err(GeoError::Denied)
    }
}

/// No detection provider is available.
pub struct UnsupportedGeolocator;

impl Geolocator for UnsupportedGeolocator {
    fn locate(&self) -> Result<(f64, f64), GeoError> {
        Err(GeoError::Unsupported)
    }
}

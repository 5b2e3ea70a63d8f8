use tracing::{info, warn};

use crate::state::{LocationSample, Snapshot};

mod reverse;

pub use reverse::{describe_location, reverse_geocode_url, ReverseGeocoder};

const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn format_coords(lat: f64, lon: f64) -> String {
    format!("{lat:.6}, {lon:.6}")
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Sum of consecutive legs. Zero for fewer than two samples.
pub fn total_distance_km(samples: &[LocationSample]) -> f64 {
    samples
        .windows(2)
        .map(|w| haversine_km(w[0].latitude, w[0].longitude, w[1].latitude, w[1].longitude))
        .fold(0.0, |acc, d| acc + d)
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary {
    pub count: usize,
    pub distance_km: f64,
    /// First to last sample, rounded.
    pub duration_minutes: i64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl RouteSummary {
    pub fn from_samples(samples: &[LocationSample]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;
        let duration_ms = (last.timestamp - first.timestamp) as f64;
        Some(Self {
            count: samples.len(),
            distance_km: total_distance_km(samples),
            duration_minutes: (duration_ms / 60_000.0).round() as i64,
            start: (first.latitude, first.longitude),
            end: (last.latitude, last.longitude),
        })
    }

    /// `"N locations tracked • X.XX km traveled"`.
    pub fn stats_line(&self) -> String {
        format!(
            "{} locations tracked • {:.2} km traveled",
            self.count, self.distance_km
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeoErrorKind {
    PermissionDenied,
    Unavailable,
    Timeout,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GpsStatus {
    Active,
    #[default]
    Inactive,
    Error(GeoErrorKind),
    NotAvailable,
}

impl GpsStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GpsStatus::Active => "GPS Active",
            GpsStatus::Inactive => "GPS Inactive",
            GpsStatus::Error(GeoErrorKind::PermissionDenied) => "GPS Permission Denied",
            GpsStatus::Error(GeoErrorKind::Unavailable) => "GPS Unavailable",
            GpsStatus::Error(GeoErrorKind::Timeout) => "GPS Timeout",
            GpsStatus::NotAvailable => "GPS Not Available",
        }
    }
}

/// Receives position fixes from whatever drives the device's location
/// service and records them into the meta location history.
#[derive(Debug, Default)]
pub struct LocationTracker {
    tracking: bool,
    denied: bool,
    status: GpsStatus,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GpsStatus {
        self.status
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Refused once permission was denied in this session.
    pub fn start(&mut self) -> bool {
        if self.denied {
            return false;
        }
        self.tracking = true;
        self.status = GpsStatus::Active;
        info!("gps tracking started");
        true
    }

    pub fn stop(&mut self) {
        self.tracking = false;
        if !self.denied {
            self.status = GpsStatus::Inactive;
        }
    }

    /// Appends the fix while tracking. Returns whether it was recorded.
    /// Fixes with non-finite coordinates or accuracy are rejected; non-finite
    /// optional readings are dropped.
    pub fn on_sample(&mut self, snapshot: &mut Snapshot, mut sample: LocationSample) -> bool {
        if !self.tracking {
            return false;
        }
        if !(sample.latitude.is_finite()
            && sample.longitude.is_finite()
            && sample.accuracy.is_finite())
        {
            warn!(
                lat = sample.latitude,
                lon = sample.longitude,
                "ignoring non-finite position fix"
            );
            return false;
        }
        for reading in [&mut sample.altitude, &mut sample.heading, &mut sample.speed] {
            if reading.is_some_and(|v| !v.is_finite()) {
                *reading = None;
            }
        }
        snapshot.meta_location_history.push(sample);
        self.status = GpsStatus::Active;
        true
    }

    pub fn on_error(&mut self, kind: GeoErrorKind) -> GpsStatus {
        warn!(?kind, "gps error");
        if kind == GeoErrorKind::PermissionDenied {
            self.denied = true;
            self.tracking = false;
        }
        self.status = GpsStatus::Error(kind);
        self.status
    }
}

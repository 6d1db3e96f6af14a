// Client for OSRM-compatible routing services

use std::time::Duration;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use super::RoutingService;
use crate::NikromeError;
use crate::config::RoutingConfig;
use crate::geo::LatLng;

/// Status code OSRM puts in the payload of a successful lookup
pub const OSRM_OK: &str = "Ok";

/// Payload of an OSRM `route` request with `geometries=geojson`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub geometry: RouteGeometry,
}

/// GeoJSON line string, coordinates are `[longitude, latitude]`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteResponse {
    /// Successful payload with a single route through `coordinates`
    pub fn ok(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            code: OSRM_OK.to_string(),
            message: None,
            routes: vec![Route {
                geometry: RouteGeometry { coordinates },
            }],
        }
    }
}

pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

impl OsrmClient {
    pub fn new(config: &RoutingConfig) -> Result<Self, NikromeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .user_agent(concat!("nikrome/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NikromeError::RoutingClientError { source: e })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        })
    }

    /// Request URL for a route through `waypoints`, in order
    pub fn route_url(&self, waypoints: &[LatLng]) -> String {
        let coords = waypoints
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.base_url, self.profile, coords
        )
    }
}

impl RoutingService for OsrmClient {
    async fn route(&self, waypoints: &[LatLng]) -> Result<RouteResponse, NikromeError> {
        let url = self.route_url(waypoints);
        debug!("Requesting route: {}", url);

        // OSRM reports failures in the payload, often with a 4xx status, so
        // the status line is not checked here
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| NikromeError::RoutingRequestError { source: e })?
            .json::<RouteResponse>()
            .await
            .map_err(|e| NikromeError::RoutingRequestError { source: e })
    }
}

//! OSRM walking routes

use crate::client::{join_url, SafePathClient};
use crate::error::{ApiError, ApiResult};
use reqwest::Method;
use safepath_engine::{Coordinate, EngineError, EngineResult, RouteLeg, RouteService};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OSRM status code for a successful lookup
const OSRM_OK: &str = "Ok";

/// Routing API interface
#[derive(Clone)]
pub struct RoutingApi {
    client: SafePathClient,
}

impl RoutingApi {
    pub(crate) fn new(client: SafePathClient) -> Self {
        Self { client }
    }

    /// `route/v1/foot` URL for a two-point walking route
    pub fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        let path = format!(
            "route/v1/foot/{},{};{},{}?overview=full&geometries=geojson",
            origin.longitude, origin.latitude, destination.longitude, destination.latitude
        );
        join_url(&self.client.config().routing_url, &path)
    }

    /// Fetch and decode an OSRM response.
    ///
    /// OSRM reports "no route" as a 400 with a JSON body, so client errors
    /// are decoded rather than treated as transport failures.
    pub async fn fetch(&self, origin: Coordinate, destination: Coordinate) -> ApiResult<OsrmResponse> {
        let url = self.route_url(origin, destination);
        let request = self.client.request_builder(Method::GET, &url);
        let response = self.client.execute_raw(request).await?;

        let status = response.status();
        if status.is_server_error() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::api_response(status.as_u16(), message));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                ApiError::Json(e)
            } else {
                ApiError::api_response(status.as_u16(), body)
            }
        })
    }
}

impl RouteService for RoutingApi {
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> EngineResult<Option<RouteLeg>> {
        let response = self
            .fetch(origin, destination)
            .await
            .map_err(|e| EngineError::routing(e.to_string()))?;

        if response.code != OSRM_OK {
            debug!(code = %response.code, message = ?response.message, "No route from OSRM");
        }
        Ok(response.into_leg())
    }
}

/// OSRM `route` service response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmRoute {
    pub geometry: OsrmGeometry,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
}

/// GeoJSON LineString with `[lon, lat]` positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmGeometry {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl OsrmResponse {
    /// First route as a leg; `None` if the lookup failed or found nothing
    pub fn into_leg(self) -> Option<RouteLeg> {
        if self.code != OSRM_OK {
            return None;
        }
        let route = self.routes.into_iter().next()?;
        let polyline: Vec<Coordinate> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coordinate::new(lat, lon))
            .filter(Coordinate::is_valid)
            .collect();

        if polyline.is_empty() {
            return None;
        }

        Some(RouteLeg {
            polyline,
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

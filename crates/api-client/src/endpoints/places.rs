//! Overpass API lookup of hospitals and shelters

use crate::client::SafePathClient;
use crate::error::ApiResult;
use safepath_engine::{Coordinate, EngineError, EngineResult, PlaceKind, PlacesSource, SafePlace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Server-side query timeout, in seconds
const QUERY_TIMEOUT_SECS: u32 = 25;

/// Places API interface
#[derive(Clone)]
pub struct PlacesApi {
    client: SafePathClient,
}

impl PlacesApi {
    pub(crate) fn new(client: SafePathClient) -> Self {
        Self { client }
    }

    /// Raw Overpass elements around `origin`
    pub async fn query(&self, origin: Coordinate, radius_meters: f64) -> ApiResult<OverpassResponse> {
        let config = self.client.config();
        let query = overpass_query(origin, radius_meters, &config.amenities);
        self.client.post_text(&config.overpass_url, query).await
    }
}

impl PlacesSource for PlacesApi {
    async fn nearby(&self, origin: Coordinate, radius_meters: f64) -> EngineResult<Vec<SafePlace>> {
        let response = self
            .query(origin, radius_meters)
            .await
            .map_err(|e| EngineError::places(e.to_string()))?;

        let total = response.elements.len();
        let places = response.into_places();
        debug!(total, usable = places.len(), "Overpass elements received");
        Ok(places)
    }
}

/// Overpass QL for nodes and ways tagged with any of `amenities`
pub fn overpass_query(origin: Coordinate, radius_meters: f64, amenities: &[String]) -> String {
    let around = format!(
        "(around:{:.0},{},{})",
        radius_meters.max(0.0),
        origin.latitude,
        origin.longitude
    );
    let filter = format!("[\"amenity\"~\"^({})$\"]", amenities.join("|"));

    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];(node{filter}{around};way{filter}{around};);out center;"
    )
}

/// Overpass interpreter response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

impl OverpassResponse {
    /// Convert elements to places, skipping those without usable coordinates
    pub fn into_places(self) -> Vec<SafePlace> {
        self.elements
            .into_iter()
            .filter_map(OverpassElement::into_place)
            .collect()
    }
}

/// A node (with `lat`/`lon`) or way (with `center`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type", default)]
    pub element_type: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Center point Overpass reports for ways with `out center`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    fn location(&self) -> Option<Coordinate> {
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        Coordinate::try_new(lat, lon).ok()
    }

    /// Build a place; unnamed elements get the kind's default name
    pub fn into_place(self) -> Option<SafePlace> {
        let location = self.location()?;
        let kind = self
            .tags
            .get("amenity")
            .map_or(PlaceKind::Other, |amenity| PlaceKind::from_amenity(amenity));
        let name = self
            .tags
            .get("name")
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| kind.default_name().to_string());

        let element_type = if self.element_type.is_empty() {
            "node"
        } else {
            self.element_type.as_str()
        };

        Some(SafePlace::new(
            format!("{element_type}/{}", self.id),
            name,
            location,
            kind,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 0.6,
        "elements": [
            {"type": "node", "id": 101, "lat": 12.99, "lon": 77.60,
             "tags": {"amenity": "hospital", "name": "St. Martha's Hospital"}},
            {"type": "node", "id": 102, "lat": 12.95, "lon": 77.58,
             "tags": {"amenity": "hospital"}},
            {"type": "way", "id": 201, "center": {"lat": 12.98, "lon": 77.61},
             "tags": {"amenity": "shelter", "name": ""}},
            {"type": "way", "id": 202, "tags": {"amenity": "shelter"}},
            {"type": "node", "id": 103, "lat": 120.0, "lon": 77.0,
             "tags": {"amenity": "hospital"}}
        ]
    }"#;

    #[test]
    fn test_parse_overpass_response() {
        let response: OverpassResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.elements.len(), 5);

        let places = response.into_places();
        assert_eq!(places.len(), 3);

        assert_eq!(places[0].id, "node/101");
        assert_eq!(places[0].name, "St. Martha's Hospital");
        assert_eq!(places[0].kind, PlaceKind::Hospital);
        assert_eq!(places[0].location, Coordinate::new(12.99, 77.60));

        assert_eq!(places[1].name, "Hospital");

        assert_eq!(places[2].id, "way/201");
        assert_eq!(places[2].name, "Shelter");
        assert_eq!(places[2].kind, PlaceKind::Shelter);
        assert_eq!(places[2].location, Coordinate::new(12.98, 77.61));
    }

    #[test]
    fn test_empty_response() {
        let response: OverpassResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_places().is_empty());
    }

    #[test]
    fn test_overpass_query() {
        let amenities = vec!["hospital".to_string(), "shelter".to_string()];
        let query = overpass_query(Coordinate::new(12.9716, 77.5946), 5000.0, &amenities);

        assert!(query.starts_with("[out:json]"));
        assert!(query.contains(r#"node["amenity"~"^(hospital|shelter)$"](around:5000,12.9716,77.5946)"#));
        assert!(query.contains("way["));
        assert!(query.ends_with("out center;"));
    }
}

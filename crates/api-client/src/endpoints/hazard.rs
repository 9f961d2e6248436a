//! Hazard broadcast endpoints

use crate::client::{join_url, SafePathClient};
use crate::error::ApiResult;
use safepath_engine::{EngineError, EngineResult, HazardSignalSource};
use serde::{Deserialize, Serialize};

/// Hazard broadcast API interface
#[derive(Clone)]
pub struct HazardApi {
    client: SafePathClient,
}

impl HazardApi {
    pub(crate) fn new(client: SafePathClient) -> Self {
        Self { client }
    }

    /// Read the current flag
    pub async fn status(&self) -> ApiResult<DangerStatus> {
        let url = join_url(&self.client.config().hazard_url, "danger-status");
        self.client.get_url(&url).await
    }

    /// Declare the hazard active
    pub async fn trigger(&self) -> ApiResult<TriggerResponse> {
        let url = join_url(&self.client.config().hazard_url, "danger");
        self.client.post_url(&url, Option::<&()>::None).await
    }
}

impl HazardSignalSource for HazardApi {
    async fn poll(&self) -> EngineResult<bool> {
        self.status()
            .await
            .map(|status| status.danger_zone)
            .map_err(|e| EngineError::signal(e.to_string()))
    }
}

/// `GET /danger-status` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerStatus {
    pub danger_zone: bool,
}

/// `POST /danger` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub alert: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_status_deserialize() {
        let status: DangerStatus = serde_json::from_str(r#"{"danger_zone": true}"#).unwrap();
        assert!(status.danger_zone);

        let status: DangerStatus = serde_json::from_str(r#"{"danger_zone": false}"#).unwrap();
        assert!(!status.danger_zone);
    }

    #[test]
    fn test_danger_status_requires_flag() {
        assert!(serde_json::from_str::<DangerStatus>("{}").is_err());
    }

    #[test]
    fn test_trigger_response_deserialize() {
        let response: TriggerResponse =
            serde_json::from_str(r#"{"alert": "danger zone activated"}"#).unwrap();
        assert_eq!(response.alert, "danger zone activated");
    }
}

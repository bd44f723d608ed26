//! HTTP client for the personnel/assignment registry
//!
//! The registry owns trainee records and vessel assignments; this service
//! only reads from it. Every request carries the bearer token issued to the
//! vessel installation.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A trainee as known to the personnel registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub rank: String,
    pub department: String,
    /// Training record completion, 0.0 to 1.0
    pub progress: f64,
    pub vessel: Option<String>,
}

/// Client for the personnel registry
pub struct PersonnelClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PersonnelClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// List trainees currently assigned on board
    pub async fn list_onboard(&self) -> Result<Vec<Trainee>> {
        let response = self
            .client
            .get(format!("{}/trainees/onboard", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Registry(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Registry(format!(
                "Failed to list onboard trainees: {} - {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Registry(e.to_string()))
    }

    /// Fetch a single trainee record
    pub async fn get_trainee(&self, id: Uuid) -> Result<Trainee> {
        let response = self
            .client
            .get(format!("{}/trainees/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Registry(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Trainee {} not found", id)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Registry(format!(
                "Failed to fetch trainee {}: {} - {}",
                id, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Registry(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personnel_client_new() {
        let client = PersonnelClient::new("http://localhost:8080", "token-123");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.token, "token-123");
    }

    #[test]
    fn test_personnel_client_new_with_strings() {
        let url = String::from("https://registry.example.com");
        let token = String::from("secret");
        let client = PersonnelClient::new(url, token);
        assert_eq!(client.base_url, "https://registry.example.com");
    }

    #[test]
    fn test_trainee_deserialization() {
        let json = r#"{
            "id": "3f0a4bd4-5b3a-4f0e-9c2e-74f2b7a1d9c1",
            "first_name": "Astrid",
            "last_name": "Karlsen",
            "rank": "Deck Cadet",
            "department": "Deck",
            "progress": 0.62,
            "vessel": "MV Nordkapp"
        }"#;
        let trainee: Trainee = serde_json::from_str(json).unwrap();
        assert_eq!(trainee.first_name, "Astrid");
        assert_eq!(trainee.department, "Deck");
        assert_eq!(trainee.vessel.as_deref(), Some("MV Nordkapp"));
    }

    #[test]
    fn test_trainee_deserialization_unassigned() {
        let json = r#"{
            "id": "3f0a4bd4-5b3a-4f0e-9c2e-74f2b7a1d9c1",
            "first_name": "Jonas",
            "last_name": "Berg",
            "rank": "Engine Cadet",
            "department": "Engine",
            "progress": 0.1,
            "vessel": null
        }"#;
        let trainee: Trainee = serde_json::from_str(json).unwrap();
        assert!(trainee.vessel.is_none());
    }
}

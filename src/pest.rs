//! Pest and disease detection from a crop photo.

use crate::api::{endpoints, ApiClient, ApiError};
use crate::soil::file_part;
use reqwest::multipart::Form;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DetectionKind {
    Pest,
    Disease,
    Deficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentKind {
    Immediate,
    Preventive,
    Organic,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Treatment {
    #[serde(rename = "type")]
    pub kind: TreatmentKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub safety: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionResult {
    pub name: String,
    /// Percentage, 0-100
    pub confidence: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: DetectionKind,
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    results: Vec<DetectionResult>,
}

/// A crop photo to analyze.
#[derive(Debug, Clone)]
pub struct CropImage {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PestApi {
    client: ApiClient,
}

impl PestApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload `image` as multipart field `image`; results come back most
    /// likely first.
    pub async fn analyze_upload(&self, image: CropImage) -> Result<Vec<DetectionResult>, ApiError> {
        let form = Form::new().part(
            "image",
            file_part(&image.file_name, image.mime_type.as_deref(), image.bytes)?,
        );

        let response: DetectionResponse = self
            .client
            .post_multipart(endpoints::PEST_ANALYZE_UPLOAD, form)
            .await?;
        info!(
            "Pest analysis of '{}' returned {} results",
            image.file_name,
            response.results.len()
        );
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn leaf() -> CropImage {
        CropImage {
            file_name: "leaf.jpg".to_string(),
            mime_type: Some("image/jpeg".to_string()),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[tokio::test]
    async fn test_analyze_upload_parses_results() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pest/analyze-upload"))
            .and(body_string_contains("name=\"image\"; filename=\"leaf.jpg\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "name": "Aphids",
                    "confidence": 94,
                    "severity": "Medium",
                    "type": "Pest",
                    "description": "Small sap-sucking insects",
                    "symptoms": ["Curled leaves", "Sticky residue"],
                    "treatments": [{
                        "type": "organic",
                        "title": "Neem oil spray",
                        "description": "Spray neem oil solution",
                        "steps": ["Mix 5ml per litre", "Spray in the evening"],
                        "safety": "Wear gloves"
                    }]
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = PestApi::new(ApiClient::new(mock_server.uri()));
        let results = api.analyze_upload(leaf()).await.unwrap();

        assert_eq!(results.len(), 1);
        let aphids = &results[0];
        assert_eq!(aphids.kind, DetectionKind::Pest);
        assert_eq!(aphids.severity, Severity::Medium);
        assert_eq!(aphids.confidence, 94.0);
        assert_eq!(aphids.treatments[0].kind, TreatmentKind::Organic);
        assert_eq!(aphids.treatments[0].steps.len(), 2);
        assert!(aphids.treatments[0].products.is_empty());
    }

    #[tokio::test]
    async fn test_missing_results_is_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pest/analyze-upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock_server)
            .await;

        let api = PestApi::new(ApiClient::new(mock_server.uri()));
        assert!(api.analyze_upload(leaf()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pest/analyze-upload"))
            .respond_with(ResponseTemplate::new(413).set_body_string("Image too large"))
            .mount(&mock_server)
            .await;

        let api = PestApi::new(ApiClient::new(mock_server.uri()));
        let err = api.analyze_upload(leaf()).await.unwrap_err();
        assert_eq!(err.status(), Some(413));
    }

    #[test]
    fn test_bad_mime_type_is_invalid_request() {
        let err = file_part("leaf.jpg", Some("not a mime"), Vec::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}

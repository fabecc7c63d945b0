//! Soil health analysis: manual parameter entry, lab report upload and the
//! auto-saved form draft.

use crate::api::{endpoints, ApiClient, ApiError};
use crate::storage::{PreferenceStorage, StorageError, SOIL_TEST_DRAFT_KEY};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown after a draft is written.
pub const DRAFT_SAVED_MESSAGE: &str = "Draft saved automatically";

/// Form fields sent as numbers.
const NUMERIC_FIELDS: &[&str] = &[
    "ph",
    "nitrogen",
    "phosphorus",
    "potassium",
    "organicMatter",
    "moisture",
    "temperature",
    "salinity",
    "landSizeSqft",
];

#[derive(Debug, Error)]
pub enum SoilError {
    #[error("'{field}' must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The manual entry form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoilFormValues {
    pub ph: String,
    pub nitrogen: String,
    pub phosphorus: String,
    pub potassium: String,
    pub organic_matter: String,
    pub moisture: String,
    pub temperature: String,
    pub salinity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_size_sqft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_stage: Option<String>,
}

impl SoilFormValues {
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("ph", Some(self.ph.as_str())),
            ("nitrogen", Some(self.nitrogen.as_str())),
            ("phosphorus", Some(self.phosphorus.as_str())),
            ("potassium", Some(self.potassium.as_str())),
            ("organicMatter", Some(self.organic_matter.as_str())),
            ("moisture", Some(self.moisture.as_str())),
            ("temperature", Some(self.temperature.as_str())),
            ("salinity", Some(self.salinity.as_str())),
            ("landSizeSqft", self.land_size_sqft.as_deref()),
            ("crop", self.crop.as_deref()),
            ("cropStage", self.crop_stage.as_deref()),
        ]
    }

    /// Request body for `/api/soil/analyze`.
    ///
    /// Empty fields are left out; numeric fields are sent as numbers.
    pub fn to_payload(&self) -> Result<Map<String, Value>, SoilError> {
        let mut payload = Map::new();

        for (field, value) in self.fields() {
            let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = if NUMERIC_FIELDS.contains(&field) {
                let number = value
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| SoilError::InvalidNumber {
                        field,
                        value: value.to_string(),
                    })?;
                Value::Number(number)
            } else {
                Value::String(value.to_string())
            };
            payload.insert(field.to_string(), value);
        }

        Ok(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilAnalysis {
    pub overall_score: f64,
    pub status: SoilStatus,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub irrigation_liters: Option<f64>,
    #[serde(default)]
    pub irrigation_note: Option<String>,
}

/// Optional context sent along with an uploaded lab report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadExtras {
    pub land_size_sqft: Option<String>,
    pub crop: Option<String>,
    pub crop_stage: Option<String>,
}

/// A lab report file to upload.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub(crate) fn file_part(
    file_name: &str,
    mime_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<Part, ApiError> {
    let part = Part::bytes(bytes).file_name(file_name.to_string());
    match mime_type {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|e| ApiError::InvalidRequest(format!("mime type '{}': {}", mime, e))),
        None => Ok(part),
    }
}

#[derive(Debug, Clone)]
pub struct SoilApi {
    client: ApiClient,
}

impl SoilApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, form: &SoilFormValues) -> Result<SoilAnalysis, SoilError> {
        let payload = form.to_payload()?;
        debug!("Analyzing soil with {} fields", payload.len());

        let analysis: SoilAnalysis = self.client.post(endpoints::SOIL_ANALYZE, &payload).await?;
        info!(
            "Soil analysis: score {} ({:?})",
            analysis.overall_score, analysis.status
        );
        Ok(analysis)
    }

    /// Upload a lab report as multipart `file`, with any non-empty extras.
    pub async fn analyze_upload(
        &self,
        report: ReportFile,
        extras: &UploadExtras,
    ) -> Result<SoilAnalysis, SoilError> {
        let mut form = Form::new().part(
            "file",
            file_part(&report.file_name, report.mime_type.as_deref(), report.bytes)?,
        );
        for (name, value) in [
            ("landSizeSqft", &extras.land_size_sqft),
            ("crop", &extras.crop),
            ("cropStage", &extras.crop_stage),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                form = form.text(name, value.to_string());
            }
        }

        info!("Uploading soil report '{}'", report.file_name);
        Ok(self
            .client
            .post_multipart(endpoints::SOIL_ANALYZE_UPLOAD, form)
            .await?)
    }
}

/// Persist the in-progress form. Returns the status line to show.
pub fn save_draft(
    storage: &dyn PreferenceStorage,
    form: &SoilFormValues,
) -> Result<&'static str, StorageError> {
    let json = serde_json::to_string(form)?;
    storage.set(SOIL_TEST_DRAFT_KEY, &json)?;
    debug!("Soil test draft saved");
    Ok(DRAFT_SAVED_MESSAGE)
}

/// The saved draft, if there is a readable one.
pub fn load_draft(storage: &dyn PreferenceStorage) -> Option<SoilFormValues> {
    let raw = storage.get(SOIL_TEST_DRAFT_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(form) => Some(form),
        Err(e) => {
            warn!("Ignoring unreadable soil test draft: {}", e);
            None
        }
    }
}

pub fn clear_draft(storage: &dyn PreferenceStorage) -> Result<(), StorageError> {
    storage.remove(SOIL_TEST_DRAFT_KEY)
}

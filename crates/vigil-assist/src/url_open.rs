//! Human-gated URL opening
//!
//! Prepares submission URLs for the human to open. The URL is carried
//! verbatim: no validation, no parsing, no platform detection, no
//! safety classification. Without an explicit human confirmation
//! nothing is prepared at all, and the actual open is performed by the
//! embedding application as a visible action.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vigil_boundary::{BoundaryGuard, ComponentManifest};

use crate::error::{AssistError, Result};

/// Attribution carried by every prepared open.
pub const HUMAN_ATTRIBUTION: &str = "HUMAN";

/// One human-confirmed URL open, ready for the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlOpenRequest {
    pub request_id: Uuid,
    /// The URL exactly as the human provided it.
    pub url: String,
    pub timestamp: DateTime<Utc>,
    /// Always `"HUMAN"`.
    pub attribution: String,
}

/// Gate that refuses URL preparation without human confirmation.
pub struct UrlOpenGate {
    requests: Mutex<Vec<UrlOpenRequest>>,
}

impl UrlOpenGate {
    /// Construct the gate, presenting its manifest to the guard.
    pub fn new(guard: &BoundaryGuard) -> Result<Self> {
        let manifest = ComponentManifest::new("url_open_gate").with_method("request_open");
        guard.admit(&manifest)?;
        Ok(UrlOpenGate {
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Prepare a URL open under explicit human confirmation.
    ///
    /// The URL passes through untouched; refusal is the only logic
    /// here. `human_confirmed` false means nothing happens.
    pub fn request_open(&self, url: &str, human_confirmed: bool) -> Result<UrlOpenRequest> {
        if !human_confirmed {
            return Err(AssistError::InvalidObservation(
                "URL open requires explicit human confirmation".to_string(),
            ));
        }

        let request = UrlOpenRequest {
            request_id: Uuid::new_v4(),
            url: url.to_string(),
            timestamp: Utc::now(),
            attribution: HUMAN_ATTRIBUTION.to_string(),
        };
        info!(request_id = %request.request_id, "URL open prepared under human confirmation");
        self.requests.lock().push(request.clone());
        Ok(request)
    }

    /// Every prepared open, in order.
    pub fn requests(&self) -> Vec<UrlOpenRequest> {
        self.requests.lock().clone()
    }
}

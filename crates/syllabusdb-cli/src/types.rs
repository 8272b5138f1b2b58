//! API response types for the gateway client.
//!
//! These types mirror the responses from the syllabusdb-gateway admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Queue Types
// =============================================================================

/// A syllabus record as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Syllabus {
    /// Parent college id.
    pub college_id: String,
    /// Parent course id.
    pub course_id: String,
    /// Syllabus id.
    pub id: String,
    /// Professor teaching the course.
    pub professor: String,
    /// Term (e.g. `Fall`).
    pub term: String,
    /// Year the course was taught.
    pub year: i32,
    /// Public download URL of the PDF.
    pub pdf_url: String,
    /// Uploader uid.
    pub owner: String,
    /// Upload time.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Syllabus {
    /// Path of the syllabus document, as accepted by the syllabus subcommands.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "colleges/{}/courses/{}/syllabi/{}",
            self.college_id, self.course_id, self.id
        )
    }
}

/// A pending syllabus with its parents' display values.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingSyllabus {
    /// The record.
    pub syllabus: Syllabus,
    /// College display name.
    pub college_name: String,
    /// Course code.
    pub course_code: String,
    /// Course title, possibly empty.
    pub course_title: String,
}

/// Pending syllabi of one uploader.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerGroup {
    /// Uploader uid.
    pub owner: String,
    /// Their pending syllabi.
    pub syllabi: Vec<PendingSyllabus>,
}

/// Pending syllabi of one college.
#[derive(Debug, Clone, Deserialize)]
pub struct CollegeGroup {
    /// College id.
    pub college_id: String,
    /// College display name.
    pub college_name: String,
    /// Uploaders.
    pub owners: Vec<OwnerGroup>,
}

/// A pending college request.
#[derive(Debug, Clone, Deserialize)]
pub struct College {
    /// College id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State.
    #[serde(default)]
    pub state: String,
    /// Requesting user.
    pub owner: String,
}

/// Response for `GET /v1/admin/pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingResponse {
    /// Pending syllabi grouped by college and uploader.
    pub groups: Vec<CollegeGroup>,
    /// Pending college requests.
    pub colleges: Vec<College>,
}

// =============================================================================
// Action Types
// =============================================================================

/// Body sent with an admin action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionRequest {
    /// Uploader to notify, for syllabus approvals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Reason, for rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The admin's confirmation.
    pub confirm: bool,
}

/// Result of an admin action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// The action was carried out.
    Applied,
    /// The action was abandoned before any write.
    Aborted(String),
}

/// Engine counts from a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScanVerdict {
    /// Engines flagging the file as malicious.
    pub malicious: u32,
    /// Engines flagging the file as suspicious.
    pub suspicious: u32,
    /// Engines reporting the file harmless.
    pub harmless: u32,
    /// Engines that timed out.
    pub timeout: u32,
    /// Engines with no opinion.
    pub undetected: u32,
}

/// Latest scan state of a syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanResult {
    /// Still running.
    Pending,
    /// Finished with a verdict.
    Complete {
        /// Engine counts.
        verdict: ScanVerdict,
    },
    /// The scan failed.
    Failed {
        /// What went wrong.
        error: String,
    },
}

// =============================================================================
// Error Types
// =============================================================================

/// Error body returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

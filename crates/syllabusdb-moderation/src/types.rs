//! Request and response types for moderation operations.

use serde::{Deserialize, Serialize};
use syllabusdb_core::{CollegeId, Uid};
use syllabusdb_store::{College, Syllabus};

/// How an admin action ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// Every write was made.
    Applied,
    /// The admin backed out before any write.
    Aborted(AbortReason),
}

/// Why an action was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// The confirmation was declined.
    Declined,
    /// The reason was empty, whitespace, or cancelled.
    MissingReason,
    /// The syllabus was approved by an earlier action.
    AlreadyApproved,
}

/// A pending syllabus with display values resolved from its parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSyllabus {
    /// The syllabus record.
    pub syllabus: Syllabus,
    /// Parent college name, or the college id when the college is missing.
    pub college_name: String,
    /// Parent course code, or the course id when the course is missing.
    pub course_code: String,
    /// Parent course title, empty when the course is missing.
    pub course_title: String,
}

/// Everything awaiting moderation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingItems {
    /// Pending syllabi, newest first.
    pub syllabi: Vec<PendingSyllabus>,
    /// Pending college requests, in store order.
    pub colleges: Vec<College>,
}

/// Pending syllabi of one college, split by uploader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeGroup {
    /// The college.
    pub college_id: CollegeId,
    /// Display name of the college.
    pub college_name: String,
    /// Uploaders, in order of their newest syllabus.
    pub owners: Vec<OwnerGroup>,
}

/// Pending syllabi uploaded by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerGroup {
    /// The uploader.
    pub owner: Uid,
    /// Their pending syllabi, newest first.
    pub syllabi: Vec<PendingSyllabus>,
}

/// Configuration for the moderation service.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Public site URL used in notification bodies.
    pub site_url: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            site_url: "https://syllabusdb.com".to_string(),
        }
    }
}

//! Domain types stored in the database.
//!
//! These types mirror the documents of the hosted store. Field names on the
//! wire follow the document schema (`approvedSyllabiTotal`, `pdf_url`, ...),
//! so the same structs can be exchanged with other clients of the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use syllabusdb_core::{CollegeId, CourseId, CourseRef, SyllabusId, SyllabusRef, Uid};

/// A college record. Requested by a user, then approved or deleted by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    /// Document id (e.g. `hunter`).
    pub id: CollegeId,
    /// Display name.
    pub name: String,
    /// City the college is in.
    #[serde(default)]
    pub city: String,
    /// State the college is in.
    #[serde(default)]
    pub state: String,
    /// Whether an admin has approved the college request.
    pub approved: bool,
    /// Number of approved syllabi across all of the college's courses.
    #[serde(rename = "approvedSyllabiTotal", default)]
    pub approved_syllabi_total: i64,
    /// The user who requested the college.
    pub owner: Uid,
    /// When the request was created.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A course record, child of a college.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Parent college.
    pub college_id: CollegeId,
    /// Document id.
    pub id: CourseId,
    /// Course code shown to students (e.g. `CSCI 135`).
    pub code: String,
    /// Course title. May be empty.
    #[serde(default)]
    pub title: String,
    /// Whether the course has at least one approved syllabus.
    pub approved: bool,
    /// Number of approved child syllabi.
    #[serde(rename = "approvedSyllabiCount", default)]
    pub approved_syllabi_count: i64,
}

impl Course {
    /// Reference to this course document.
    #[must_use]
    pub fn reference(&self) -> CourseRef {
        CourseRef::new(self.college_id.clone(), self.id.clone())
    }
}

/// A syllabus record, child of a course. Backed by an uploaded PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllabus {
    /// Parent college.
    pub college_id: CollegeId,
    /// Parent course.
    pub course_id: CourseId,
    /// Document id.
    pub id: SyllabusId,
    /// Professor teaching the course.
    pub professor: String,
    /// Term (e.g. `Fall`).
    pub term: String,
    /// Year the course was taught.
    pub year: i32,
    /// Public download URL of the PDF.
    pub pdf_url: String,
    /// Path of the PDF in the blob store.
    pub file_path: String,
    /// Whether an admin has approved the syllabus.
    pub approved: bool,
    /// The user who uploaded the syllabus.
    pub owner: Uid,
    /// When the syllabus was uploaded.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Free-text notes from the uploader about the course.
    #[serde(default)]
    pub experience_text: Option<String>,
}

impl Syllabus {
    /// Reference to this syllabus document.
    #[must_use]
    pub fn reference(&self) -> SyllabusRef {
        SyllabusRef::new(
            self.college_id.clone(),
            self.course_id.clone(),
            self.id.clone(),
        )
    }

    /// Reference to the parent course document.
    #[must_use]
    pub fn course_ref(&self) -> CourseRef {
        CourseRef::new(self.college_id.clone(), self.course_id.clone())
    }
}

/// Per-user settings, keyed by uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Email address on file, if any.
    #[serde(default)]
    pub email: Option<String>,
    /// Whether the user wants moderation emails.
    #[serde(rename = "wantsEmailNotifications", default)]
    pub wants_email_notifications: bool,
}

impl UserProfile {
    /// The address to notify, if the user opted in and has a non-empty email.
    #[must_use]
    pub fn notification_email(&self) -> Option<&str> {
        if !self.wants_email_notifications {
            return None;
        }
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Site-wide aggregate counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Number of approved syllabi across the whole site.
    pub total_syllabi: i64,
    /// Last time a counter changed.
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_email_requires_opt_in() {
        let profile = UserProfile {
            email: Some("u1@example.com".to_string()),
            wants_email_notifications: false,
        };
        assert_eq!(profile.notification_email(), None);
    }

    #[test]
    fn notification_email_requires_address() {
        let missing = UserProfile {
            email: None,
            wants_email_notifications: true,
        };
        assert_eq!(missing.notification_email(), None);

        let blank = UserProfile {
            email: Some("  ".to_string()),
            wants_email_notifications: true,
        };
        assert_eq!(blank.notification_email(), None);
    }

    #[test]
    fn notification_email_when_opted_in() {
        let profile = UserProfile {
            email: Some("u1@example.com".to_string()),
            wants_email_notifications: true,
        };
        assert_eq!(profile.notification_email(), Some("u1@example.com"));
    }
}

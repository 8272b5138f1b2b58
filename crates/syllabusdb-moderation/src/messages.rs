//! Notification texts sent to users after an admin decision.

use serde::{Deserialize, Serialize};

/// An email to one user, as accepted by the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient address.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub message: String,
}

/// Subject and body of a notification, before an address is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub message: String,
}

impl Message {
    /// Address the message to `email`.
    #[must_use]
    pub fn to(self, email: impl Into<String>) -> Notification {
        Notification {
            email: email.into(),
            subject: self.subject,
            message: self.message,
        }
    }
}

/// A syllabus was approved and is now public.
#[must_use]
pub fn syllabus_approved(course_code: &str, site_url: &str) -> Message {
    Message {
        subject: format!("Your {course_code} syllabus was approved"),
        message: format!(
            "Thanks for contributing to SyllabusDB! Your syllabus for {course_code} has been \
             approved and is now visible to other students at {site_url}."
        ),
    }
}

/// A syllabus was rejected and removed.
#[must_use]
pub fn syllabus_disapproved(course_code: &str, reason: &str, site_url: &str) -> Message {
    Message {
        subject: format!("Your {course_code} syllabus was not approved"),
        message: format!(
            "Your syllabus upload for {course_code} was reviewed and removed.\n\n\
             Reason: {reason}\n\n\
             You are welcome to upload a corrected version at {site_url}."
        ),
    }
}

/// A college request was approved.
#[must_use]
pub fn college_approved(college_name: &str, site_url: &str) -> Message {
    Message {
        subject: format!("{college_name} was added to SyllabusDB"),
        message: format!(
            "Your request to add {college_name} has been approved. You can now upload \
             syllabi for its courses at {site_url}."
        ),
    }
}

/// A college request was rejected.
#[must_use]
pub fn college_disapproved(college_name: &str, reason: &str) -> Message {
    Message {
        subject: format!("Your request to add {college_name} was not approved"),
        message: format!(
            "Your request to add {college_name} to SyllabusDB was reviewed and declined.\n\n\
             Reason: {reason}"
        ),
    }
}

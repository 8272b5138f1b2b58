//! Document identifier types for SyllabusDB.
//!
//! Every document in the store is addressed by a string id chosen by the
//! client that created it (a course code, a college slug, a generated key).
//! The newtypes here keep the different ids from being mixed up and enforce
//! the path-segment rules of the document store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Maximum length of a document id, in bytes.
pub const MAX_ID_BYTES: usize = 1500;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier was empty.
    #[error("identifier is empty")]
    Empty,

    /// The identifier exceeded the maximum length.
    #[error("identifier is {got} bytes, maximum is {max}")]
    TooLong {
        /// Maximum allowed bytes.
        max: usize,
        /// Actual number of bytes.
        got: usize,
    },

    /// The identifier contained a character that cannot appear in a path segment.
    #[error("identifier contains forbidden character {0:?}")]
    ForbiddenChar(char),

    /// The identifier is reserved (`.` or `..`).
    #[error("identifier {0:?} is reserved")]
    Reserved(String),
}

/// Validate a single path segment.
///
/// # Errors
///
/// Returns an error if the segment is empty, too long, reserved, or contains
/// `/` or NUL.
pub fn validate_segment(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() > MAX_ID_BYTES {
        return Err(IdError::TooLong {
            max: MAX_ID_BYTES,
            got: s.len(),
        });
    }
    if s == "." || s == ".." {
        return Err(IdError::Reserved(s.to_string()));
    }
    if let Some(c) = s.chars().find(|c| *c == '/' || *c == '\0') {
        return Err(IdError::ForbiddenChar(c));
    }
    Ok(())
}

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, validating it as a path segment.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is not a valid path segment.
            pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
                let value = value.into();
                validate_segment(&value)?;
                Ok(Self(value))
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

document_id! {
    /// Identifier of a college document (e.g. `hunter`).
    CollegeId
}

document_id! {
    /// Identifier of a course document under a college (e.g. `CSCI 135`).
    CourseId
}

document_id! {
    /// Identifier of a syllabus document under a course.
    SyllabusId
}

document_id! {
    /// User identifier issued by the identity provider (the token `sub` claim).
    Uid
}

/// Full reference to a course document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseRef {
    /// Parent college.
    pub college_id: CollegeId,
    /// The course itself.
    pub course_id: CourseId,
}

impl CourseRef {
    /// Create a new course reference.
    #[must_use]
    pub const fn new(college_id: CollegeId, course_id: CourseId) -> Self {
        Self {
            college_id,
            course_id,
        }
    }
}

impl fmt::Display for CourseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "colleges/{}/courses/{}", self.college_id, self.course_id)
    }
}

/// Full reference to a syllabus document:
/// `colleges/{college}/courses/{course}/syllabi/{syllabus}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyllabusRef {
    /// Parent college.
    pub college_id: CollegeId,
    /// Parent course.
    pub course_id: CourseId,
    /// The syllabus itself.
    pub syllabus_id: SyllabusId,
}

impl SyllabusRef {
    /// Create a new syllabus reference.
    #[must_use]
    pub const fn new(college_id: CollegeId, course_id: CourseId, syllabus_id: SyllabusId) -> Self {
        Self {
            college_id,
            course_id,
            syllabus_id,
        }
    }

    /// Reference to the parent course.
    #[must_use]
    pub fn course(&self) -> CourseRef {
        CourseRef::new(self.college_id.clone(), self.course_id.clone())
    }
}

impl FromStr for SyllabusRef {
    type Err = CoreError;

    /// Parse a `colleges/{college}/courses/{course}/syllabi/{syllabus}` path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim_matches('/').split('/').collect();
        match parts.as_slice() {
            ["colleges", college, "courses", course, "syllabi", syllabus] => Ok(Self::new(
                CollegeId::new(*college)?,
                CourseId::new(*course)?,
                SyllabusId::new(*syllabus)?,
            )),
            _ => Err(CoreError::InvalidPath(s.to_string())),
        }
    }
}

impl fmt::Display for SyllabusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "colleges/{}/courses/{}/syllabi/{}",
            self.college_id, self.course_id, self.syllabus_id
        )
    }
}

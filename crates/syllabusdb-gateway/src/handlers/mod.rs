//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the admin API.

pub mod colleges;
pub mod health;
pub mod pending;
pub mod scan;
pub mod syllabi;

use syllabusdb_core::{CollegeId, CourseId, SyllabusId, SyllabusRef};

use crate::error::ApiError;

/// Parse a college id from a path segment.
pub(crate) fn parse_college_id(s: &str) -> Result<CollegeId, ApiError> {
    CollegeId::new(s).map_err(|e| ApiError::BadRequest(format!("invalid college id: {e}")))
}

/// Parse a syllabus id from a path segment.
pub(crate) fn parse_syllabus_id(s: &str) -> Result<SyllabusId, ApiError> {
    SyllabusId::new(s).map_err(|e| ApiError::BadRequest(format!("invalid syllabus id: {e}")))
}

/// Build a syllabus reference from its three path segments.
pub(crate) fn parse_syllabus_ref(
    college: &str,
    course: &str,
    syllabus: &str,
) -> Result<SyllabusRef, ApiError> {
    let course_id =
        CourseId::new(course).map_err(|e| ApiError::BadRequest(format!("invalid course id: {e}")))?;
    Ok(SyllabusRef::new(
        parse_college_id(college)?,
        course_id,
        parse_syllabus_id(syllabus)?,
    ))
}

//! Core types for SyllabusDB.
//!
//! This crate provides the foundational types shared by every other crate:
//!
//! - **Identifiers**: strongly-typed document ids for colleges, courses,
//!   syllabi, and users
//! - **References**: full paths to nested course and syllabus documents
//!
//! # Example
//!
//! ```
//! use syllabusdb_core::{CollegeId, CourseId, SyllabusRef};
//!
//! let syllabus: SyllabusRef = "colleges/hunter/courses/CSCI 135/syllabi/abc"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(syllabus.college_id, CollegeId::new("hunter").unwrap());
//! assert_eq!(syllabus.course_id, CourseId::new("CSCI 135").unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;

pub use error::{CoreError, Result};
pub use ids::{CollegeId, CourseId, CourseRef, IdError, SyllabusId, SyllabusRef, Uid};

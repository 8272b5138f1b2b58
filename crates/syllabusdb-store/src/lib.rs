//! Document and blob storage for SyllabusDB.
//!
//! This crate defines the two storage collaborators of the moderation
//! workflow and ships local implementations of both:
//!
//! - [`DocumentStore`]: the hierarchical document database
//!   (`colleges → courses → syllabi`, plus `users` and `stats`), implemented
//!   by [`RocksStore`]
//! - [`BlobStore`]: storage for uploaded PDF files keyed by path,
//!   implemented by [`FsBlobStore`]
//!
//! # Architecture
//!
//! The `RocksDB` store uses the following column families:
//!
//! - `colleges`: college records, keyed by `college_id`
//! - `courses`: course records, keyed by `college_id \0 course_id`
//! - `syllabi`: syllabus records, keyed by `college_id \0 course_id \0 syllabus_id`
//! - `pending_syllabi`: index of syllabi with `approved == false`
//! - `users`: user profiles, keyed by `uid`
//! - `stats`: the global statistics singleton
//!
//! # Example
//!
//! ```no_run
//! use syllabusdb_store::{DocumentStore, RocksStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RocksStore::open("/tmp/syllabusdb")?;
//!
//! for syllabus in store.list_pending_syllabi().await? {
//!     println!("pending: {}", syllabus.reference());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blob;
pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;
pub mod types;

pub use blob::{BlobStore, FsBlobStore};
pub use error::{BlobError, Result, StoreError};
pub use rocks::RocksStore;
pub use types::{College, Course, GlobalStats, Syllabus, UserProfile};

use async_trait::async_trait;
use syllabusdb_core::{CollegeId, CourseRef, SyllabusRef, Uid};

/// The document store trait defining all database operations the workflow uses.
///
/// Every call is a suspension point: the production store is a remote
/// service. Point updates (`set_*`, `increment_*`, `update_*`) fail with
/// [`StoreError::NotFound`] when the target document does not exist, except
/// [`DocumentStore::increment_global_total`], which merge-creates its
/// singleton.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // =========================================================================
    // College Operations
    // =========================================================================

    /// Insert or replace a college record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_college(&self, college: &College) -> Result<()>;

    /// Get a college by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_college(&self, college_id: &CollegeId) -> Result<Option<College>>;

    /// Delete a college record. Child courses are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the college doesn't exist.
    async fn delete_college(&self, college_id: &CollegeId) -> Result<()>;

    /// List all colleges with `approved == false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_pending_colleges(&self) -> Result<Vec<College>>;

    /// Set a college's approved flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the college doesn't exist.
    async fn set_college_approved(&self, college_id: &CollegeId, approved: bool) -> Result<()>;

    /// Add `delta` to a college's `approvedSyllabiTotal`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the college doesn't exist.
    async fn increment_college_total(&self, college_id: &CollegeId, delta: i64) -> Result<()>;

    // =========================================================================
    // Course Operations
    // =========================================================================

    /// Insert or replace a course record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_course(&self, course: &Course) -> Result<()>;

    /// Get a course by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_course(&self, course: &CourseRef) -> Result<Option<Course>>;

    /// Delete a course record. Child syllabi are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    async fn delete_course(&self, course: &CourseRef) -> Result<()>;

    /// Set a course's approved flag and add `count_delta` to its
    /// `approvedSyllabiCount`, as one update.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    async fn update_course_approval(
        &self,
        course: &CourseRef,
        approved: bool,
        count_delta: i64,
    ) -> Result<()>;

    /// Count the syllabi (approved or not) stored under a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_syllabi(&self, course: &CourseRef) -> Result<usize>;

    // =========================================================================
    // Syllabus Operations
    // =========================================================================

    /// Insert or replace a syllabus record.
    ///
    /// This also maintains the pending index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_syllabus(&self, syllabus: &Syllabus) -> Result<()>;

    /// Get a syllabus by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_syllabus(&self, syllabus: &SyllabusRef) -> Result<Option<Syllabus>>;

    /// Delete a syllabus record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the syllabus doesn't exist.
    async fn delete_syllabus(&self, syllabus: &SyllabusRef) -> Result<()>;

    /// Set a syllabus's approved flag.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the syllabus doesn't exist.
    async fn set_syllabus_approved(&self, syllabus: &SyllabusRef, approved: bool) -> Result<()>;

    /// List syllabi with `approved == false` across every college and course.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_pending_syllabi(&self) -> Result<Vec<Syllabus>>;

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or replace a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_user_profile(&self, uid: &Uid, profile: &UserProfile) -> Result<()>;

    /// Get a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_user_profile(&self, uid: &Uid) -> Result<Option<UserProfile>>;

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Get the global statistics singleton, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_global_stats(&self) -> Result<Option<GlobalStats>>;

    /// Add `delta` to `total_syllabi`, creating the singleton if absent, and
    /// stamp `updatedAt`. Returns the stats after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn increment_global_total(&self, delta: i64) -> Result<GlobalStats>;
}

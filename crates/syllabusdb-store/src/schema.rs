//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage. The
//! hierarchy `colleges/{college}/courses/{course}/syllabi/{syllabus}` is
//! flattened into one column family per collection, keyed by the joined ids.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// College documents, keyed by `college_id`.
    pub const COLLEGES: &str = "colleges";

    /// Course documents, keyed by `college_id \0 course_id`.
    pub const COURSES: &str = "courses";

    /// Syllabus documents, keyed by `college_id \0 course_id \0 syllabus_id`.
    pub const SYLLABI: &str = "syllabi";

    /// Index: syllabi awaiting approval, same keys as `syllabi`.
    pub const PENDING_SYLLABI: &str = "pending_syllabi";

    /// User profiles, keyed by `uid`.
    pub const USERS: &str = "users";

    /// Aggregate statistics singletons.
    pub const STATS: &str = "stats";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::COLLEGES,
        cf::COURSES,
        cf::SYLLABI,
        cf::PENDING_SYLLABI,
        cf::USERS,
        cf::STATS,
    ]
}

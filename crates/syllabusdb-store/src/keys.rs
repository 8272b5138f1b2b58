//! Key encoding utilities for `RocksDB`.
//!
//! Nested document paths are flattened by joining the ids with a NUL byte.
//! Ids can never contain NUL, so a key prefix always selects exactly one
//! parent's children.

use syllabusdb_core::{CollegeId, CourseRef, SyllabusRef, Uid};

const SEP: u8 = 0;

/// Key of the global statistics singleton in the `stats` column family.
pub const GLOBAL_STATS_KEY: &[u8] = b"global";

/// Encode a college key (just the id bytes).
#[must_use]
pub fn college_key(college_id: &CollegeId) -> Vec<u8> {
    college_id.as_str().as_bytes().to_vec()
}

/// Encode a course key: `college_id || 0 || course_id`.
#[must_use]
pub fn course_key(course: &CourseRef) -> Vec<u8> {
    let college = course.college_id.as_str().as_bytes();
    let id = course.course_id.as_str().as_bytes();
    let mut key = Vec::with_capacity(college.len() + id.len() + 1);
    key.extend_from_slice(college);
    key.push(SEP);
    key.extend_from_slice(id);
    key
}

/// Encode a prefix for scanning all syllabi of a course:
/// `college_id || 0 || course_id || 0`.
#[must_use]
pub fn syllabus_prefix(course: &CourseRef) -> Vec<u8> {
    let mut key = course_key(course);
    key.push(SEP);
    key
}

/// Encode a syllabus key: `college_id || 0 || course_id || 0 || syllabus_id`.
///
/// This allows efficient prefix scans for all syllabi of a course.
#[must_use]
pub fn syllabus_key(syllabus: &SyllabusRef) -> Vec<u8> {
    let mut key = syllabus_prefix(&syllabus.course());
    key.extend_from_slice(syllabus.syllabus_id.as_str().as_bytes());
    key
}

/// Encode a user key (just the uid bytes).
#[must_use]
pub fn user_key(uid: &Uid) -> Vec<u8> {
    uid.as_str().as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabusdb_core::{CourseId, SyllabusId};

    fn syllabus(college: &str, course: &str, id: &str) -> SyllabusRef {
        SyllabusRef::new(
            CollegeId::new(college).unwrap(),
            CourseId::new(course).unwrap(),
            SyllabusId::new(id).unwrap(),
        )
    }

    #[test]
    fn syllabus_key_starts_with_course_prefix() {
        let s = syllabus("hunter", "CSCI 135", "s1");
        let key = syllabus_key(&s);
        assert!(key.starts_with(&syllabus_prefix(&s.course())));
        assert_eq!(key, b"hunter\0CSCI 135\0s1".to_vec());
    }

    #[test]
    fn prefix_does_not_match_sibling_courses() {
        // "CSCI 13" must not select the syllabi of "CSCI 135".
        let s = syllabus("hunter", "CSCI 135", "s1");
        let short = CourseRef::new(
            CollegeId::new("hunter").unwrap(),
            CourseId::new("CSCI 13").unwrap(),
        );
        assert!(!syllabus_key(&s).starts_with(&syllabus_prefix(&short)));
    }
}

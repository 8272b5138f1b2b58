//! Loading and grouping of pending items.

use std::collections::HashMap;

use syllabusdb_core::{CollegeId, CourseRef};
use syllabusdb_store::{Course, DocumentStore, Syllabus};

use crate::error::Result;
use crate::types::{CollegeGroup, OwnerGroup, PendingItems, PendingSyllabus};

/// Fetch every pending syllabus and college request.
///
/// Each syllabus is enriched with its parents' display values. A missing
/// parent falls back to the raw id and never fails the load. Syllabi are
/// returned newest first.
///
/// # Errors
///
/// Returns an error if a store query fails.
pub async fn load_pending<S: DocumentStore + ?Sized>(store: &S) -> Result<PendingItems> {
    let syllabi = store.list_pending_syllabi().await?;
    let colleges = store.list_pending_colleges().await?;

    let mut college_names: HashMap<CollegeId, String> = HashMap::new();
    let mut courses: HashMap<CourseRef, Option<Course>> = HashMap::new();
    let mut pending = Vec::with_capacity(syllabi.len());

    for syllabus in syllabi {
        if !college_names.contains_key(&syllabus.college_id) {
            let name = match store.get_college(&syllabus.college_id).await? {
                Some(college) => college.name,
                None => {
                    tracing::debug!(college_id = %syllabus.college_id, "Pending syllabus has no college record");
                    syllabus.college_id.to_string()
                }
            };
            college_names.insert(syllabus.college_id.clone(), name);
        }

        let course_ref = syllabus.course_ref();
        if !courses.contains_key(&course_ref) {
            let course = store.get_course(&course_ref).await?;
            if course.is_none() {
                tracing::debug!(course = %course_ref, "Pending syllabus has no course record");
            }
            courses.insert(course_ref.clone(), course);
        }

        pending.push(enrich(
            syllabus,
            &college_names,
            courses.get(&course_ref).and_then(Option::as_ref),
        ));
    }

    sort_newest_first(&mut pending);

    tracing::debug!(
        syllabi = pending.len(),
        colleges = colleges.len(),
        "Loaded pending items"
    );

    Ok(PendingItems {
        syllabi: pending,
        colleges,
    })
}

fn enrich(
    syllabus: Syllabus,
    college_names: &HashMap<CollegeId, String>,
    course: Option<&Course>,
) -> PendingSyllabus {
    let college_name = college_names
        .get(&syllabus.college_id)
        .cloned()
        .unwrap_or_else(|| syllabus.college_id.to_string());
    let (course_code, course_title) = match course {
        Some(course) => (course.code.clone(), course.title.clone()),
        None => (syllabus.course_id.to_string(), String::new()),
    };

    PendingSyllabus {
        syllabus,
        college_name,
        course_code,
        course_title,
    }
}

/// Sort by upload time, newest first. Syllabi without a timestamp go last.
/// The sort is stable, so ties keep their current order.
pub fn sort_newest_first(syllabi: &mut [PendingSyllabus]) {
    // `None < Some(_)`, so reversing the comparison puts missing timestamps last.
    syllabi.sort_by(|a, b| b.syllabus.created_at.cmp(&a.syllabus.created_at));
}

/// Group syllabi by college, then by uploader.
///
/// Groups keep the order in which their first member appears, so a list
/// sorted newest first yields groups ordered by their newest syllabus.
#[must_use]
pub fn group_by_college_and_owner(syllabi: &[PendingSyllabus]) -> Vec<CollegeGroup> {
    let mut groups: Vec<CollegeGroup> = Vec::new();

    for item in syllabi {
        let college_idx = match groups
            .iter()
            .position(|g| g.college_id == item.syllabus.college_id)
        {
            Some(idx) => idx,
            None => {
                groups.push(CollegeGroup {
                    college_id: item.syllabus.college_id.clone(),
                    college_name: item.college_name.clone(),
                    owners: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let owners = &mut groups[college_idx].owners;

        match owners.iter_mut().find(|o| o.owner == item.syllabus.owner) {
            Some(group) => group.syllabi.push(item.clone()),
            None => owners.push(OwnerGroup {
                owner: item.syllabus.owner.clone(),
                syllabi: vec![item.clone()],
            }),
        }
    }

    groups
}

impl PendingItems {
    /// Pending syllabi grouped by college, then by uploader.
    #[must_use]
    pub fn groups(&self) -> Vec<CollegeGroup> {
        group_by_college_and_owner(&self.syllabi)
    }
}

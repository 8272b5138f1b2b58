//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the
//! `DocumentStore` trait. Read-modify-write updates (flags, counters) are
//! serialized through a single write lock so concurrent increments never
//! lose an update.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};
use syllabusdb_core::{CollegeId, CourseRef, SyllabusRef, Uid};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::types::{College, Course, GlobalStats, Syllabus, UserProfile};
use crate::DocumentStore;

/// RocksDB-backed document store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn read<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Collect every value under `prefix` in a column family.
    fn scan_prefix<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));

        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(Self::deserialize(&value)?);
        }
        Ok(values)
    }

    /// Write a syllabus record and keep the pending index in step with its flag.
    fn write_syllabus(&self, syllabus: &Syllabus) -> Result<()> {
        let cf_syllabi = self.cf(cf::SYLLABI)?;
        let cf_pending = self.cf(cf::PENDING_SYLLABI)?;
        let key = keys::syllabus_key(&syllabus.reference());

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_syllabi, &key, Self::serialize(syllabus)?);
        if syllabus.approved {
            batch.delete_cf(&cf_pending, &key);
        } else {
            batch.put_cf(&cf_pending, &key, []);
        }
        self.write(batch)
    }

    fn put_value<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db
            .put_cf(&cf, key, Self::serialize(value)?)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete_value(&self, cf_name: &str, key: &[u8], what: String) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let exists = self
            .db
            .get_pinned_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if !exists {
            return Err(StoreError::NotFound(what));
        }
        self.db
            .delete_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn update_college<F>(&self, college_id: &CollegeId, f: F) -> Result<()>
    where
        F: FnOnce(&mut College),
    {
        let _guard = self.write_lock.lock();
        let key = keys::college_key(college_id);
        let mut college: College = self
            .read(cf::COLLEGES, &key)?
            .ok_or_else(|| StoreError::NotFound(format!("colleges/{college_id}")))?;
        f(&mut college);
        self.put_value(cf::COLLEGES, &key, &college)
    }
}

#[async_trait]
impl DocumentStore for RocksStore {
    // =========================================================================
    // College Operations
    // =========================================================================

    async fn put_college(&self, college: &College) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.put_value(cf::COLLEGES, &keys::college_key(&college.id), college)
    }

    async fn get_college(&self, college_id: &CollegeId) -> Result<Option<College>> {
        self.read(cf::COLLEGES, &keys::college_key(college_id))
    }

    async fn delete_college(&self, college_id: &CollegeId) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.delete_value(
            cf::COLLEGES,
            &keys::college_key(college_id),
            format!("colleges/{college_id}"),
        )
    }

    async fn list_pending_colleges(&self) -> Result<Vec<College>> {
        let colleges: Vec<College> = self.scan_prefix(cf::COLLEGES, &[])?;
        Ok(colleges.into_iter().filter(|c| !c.approved).collect())
    }

    async fn set_college_approved(&self, college_id: &CollegeId, approved: bool) -> Result<()> {
        self.update_college(college_id, |college| college.approved = approved)
    }

    async fn increment_college_total(&self, college_id: &CollegeId, delta: i64) -> Result<()> {
        self.update_college(college_id, |college| {
            college.approved_syllabi_total += delta;
        })
    }

    // =========================================================================
    // Course Operations
    // =========================================================================

    async fn put_course(&self, course: &Course) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.put_value(cf::COURSES, &keys::course_key(&course.reference()), course)
    }

    async fn get_course(&self, course: &CourseRef) -> Result<Option<Course>> {
        self.read(cf::COURSES, &keys::course_key(course))
    }

    async fn delete_course(&self, course: &CourseRef) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.delete_value(cf::COURSES, &keys::course_key(course), course.to_string())
    }

    async fn update_course_approval(
        &self,
        course: &CourseRef,
        approved: bool,
        count_delta: i64,
    ) -> Result<()> {
        let _guard = self.write_lock.lock();
        let key = keys::course_key(course);
        let mut record: Course = self
            .read(cf::COURSES, &key)?
            .ok_or_else(|| StoreError::NotFound(course.to_string()))?;
        record.approved = approved;
        record.approved_syllabi_count += count_delta;
        self.put_value(cf::COURSES, &key, &record)
    }

    async fn count_syllabi(&self, course: &CourseRef) -> Result<usize> {
        let cf = self.cf(cf::SYLLABI)?;
        let prefix = keys::syllabus_prefix(course);
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));

        let mut count = 0usize;
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    // =========================================================================
    // Syllabus Operations
    // =========================================================================

    async fn put_syllabus(&self, syllabus: &Syllabus) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write_syllabus(syllabus)
    }

    async fn get_syllabus(&self, syllabus: &SyllabusRef) -> Result<Option<Syllabus>> {
        self.read(cf::SYLLABI, &keys::syllabus_key(syllabus))
    }

    async fn delete_syllabus(&self, syllabus: &SyllabusRef) -> Result<()> {
        let _guard = self.write_lock.lock();
        let cf_syllabi = self.cf(cf::SYLLABI)?;
        let cf_pending = self.cf(cf::PENDING_SYLLABI)?;
        let key = keys::syllabus_key(syllabus);

        if self.read::<Syllabus>(cf::SYLLABI, &key)?.is_none() {
            return Err(StoreError::NotFound(syllabus.to_string()));
        }

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_syllabi, &key);
        batch.delete_cf(&cf_pending, &key);
        self.write(batch)
    }

    async fn set_syllabus_approved(&self, syllabus: &SyllabusRef, approved: bool) -> Result<()> {
        let _guard = self.write_lock.lock();
        let key = keys::syllabus_key(syllabus);
        let mut record: Syllabus = self
            .read(cf::SYLLABI, &key)?
            .ok_or_else(|| StoreError::NotFound(syllabus.to_string()))?;
        record.approved = approved;
        self.write_syllabus(&record)
    }

    async fn list_pending_syllabi(&self) -> Result<Vec<Syllabus>> {
        let cf_pending = self.cf(cf::PENDING_SYLLABI)?;
        let iter = self.db.iterator_cf(&cf_pending, IteratorMode::Start);

        let mut syllabi = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            // The index can briefly outlive a record deleted by another writer.
            if let Some(syllabus) = self.read::<Syllabus>(cf::SYLLABI, &key)? {
                if !syllabus.approved {
                    syllabi.push(syllabus);
                }
            }
        }
        Ok(syllabi)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    async fn put_user_profile(&self, uid: &Uid, profile: &UserProfile) -> Result<()> {
        self.put_value(cf::USERS, &keys::user_key(uid), profile)
    }

    async fn get_user_profile(&self, uid: &Uid) -> Result<Option<UserProfile>> {
        self.read(cf::USERS, &keys::user_key(uid))
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    async fn get_global_stats(&self) -> Result<Option<GlobalStats>> {
        self.read(cf::STATS, keys::GLOBAL_STATS_KEY)
    }

    async fn increment_global_total(&self, delta: i64) -> Result<GlobalStats> {
        let _guard = self.write_lock.lock();
        let mut stats: GlobalStats = self
            .read(cf::STATS, keys::GLOBAL_STATS_KEY)?
            .unwrap_or_default();
        stats.total_syllabi += delta;
        stats.updated_at = Some(Utc::now());
        self.put_value(cf::STATS, keys::GLOBAL_STATS_KEY, &stats)?;
        tracing::debug!(total = stats.total_syllabi, delta, "Updated global syllabus total");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabusdb_core::{CourseId, SyllabusId};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn create_test_course(college: &str, code: &str) -> Course {
        Course {
            college_id: CollegeId::new(college).unwrap(),
            id: CourseId::new(code).unwrap(),
            code: code.to_string(),
            title: "Intro".to_string(),
            approved: false,
            approved_syllabi_count: 0,
        }
    }

    fn create_test_syllabus(college: &str, course: &str, id: &str) -> Syllabus {
        Syllabus {
            college_id: CollegeId::new(college).unwrap(),
            course_id: CourseId::new(course).unwrap(),
            id: SyllabusId::new(id).unwrap(),
            professor: "Smith".to_string(),
            term: "Fall".to_string(),
            year: 2024,
            pdf_url: format!("https://files.example.com/{id}.pdf"),
            file_path: format!("syllabi/{id}.pdf"),
            approved: false,
            owner: Uid::new("u1").unwrap(),
            created_at: Some(Utc::now()),
            experience_text: None,
        }
    }

    fn create_test_college(id: &str, approved: bool) -> College {
        College {
            id: CollegeId::new(id).unwrap(),
            name: format!("{id} College"),
            city: "New York".to_string(),
            state: "NY".to_string(),
            approved,
            approved_syllabi_total: 0,
            owner: Uid::new("u1").unwrap(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn syllabus_crud_and_pending_index() {
        let (store, _dir) = create_test_store();
        let syllabus = create_test_syllabus("hunter", "CSCI 135", "s1");
        let r = syllabus.reference();

        store.put_syllabus(&syllabus).await.unwrap();
        assert_eq!(store.get_syllabus(&r).await.unwrap(), Some(syllabus.clone()));
        assert_eq!(store.list_pending_syllabi().await.unwrap().len(), 1);

        store.set_syllabus_approved(&r, true).await.unwrap();
        assert!(store.get_syllabus(&r).await.unwrap().unwrap().approved);
        assert!(store.list_pending_syllabi().await.unwrap().is_empty());

        store.set_syllabus_approved(&r, false).await.unwrap();
        assert_eq!(store.list_pending_syllabi().await.unwrap().len(), 1);

        store.delete_syllabus(&r).await.unwrap();
        assert!(store.get_syllabus(&r).await.unwrap().is_none());
        assert!(store.list_pending_syllabi().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn point_updates_require_existing_document() {
        let (store, _dir) = create_test_store();
        let syllabus = create_test_syllabus("hunter", "CSCI 135", "missing");

        assert!(matches!(
            store.set_syllabus_approved(&syllabus.reference(), true).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store
                .update_course_approval(&syllabus.course_ref(), true, 1)
                .await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store
                .increment_college_total(&syllabus.college_id, 1)
                .await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_syllabus(&syllabus.reference()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn course_approval_updates_flag_and_count() {
        let (store, _dir) = create_test_store();
        let course = create_test_course("hunter", "CSCI 135");
        store.put_course(&course).await.unwrap();

        store
            .update_course_approval(&course.reference(), true, 1)
            .await
            .unwrap();
        store
            .update_course_approval(&course.reference(), true, 1)
            .await
            .unwrap();

        let stored = store.get_course(&course.reference()).await.unwrap().unwrap();
        assert!(stored.approved);
        assert_eq!(stored.approved_syllabi_count, 2);
    }

    #[tokio::test]
    async fn count_syllabi_is_scoped_to_course() {
        let (store, _dir) = create_test_store();
        store
            .put_syllabus(&create_test_syllabus("hunter", "CSCI 135", "s1"))
            .await
            .unwrap();
        store
            .put_syllabus(&create_test_syllabus("hunter", "CSCI 135", "s2"))
            .await
            .unwrap();
        store
            .put_syllabus(&create_test_syllabus("hunter", "CSCI 13", "s3"))
            .await
            .unwrap();

        let course = create_test_course("hunter", "CSCI 135").reference();
        assert_eq!(store.count_syllabi(&course).await.unwrap(), 2);

        let other = create_test_course("baruch", "CSCI 135").reference();
        assert_eq!(store.count_syllabi(&other).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_pending_colleges_filters_approved() {
        let (store, _dir) = create_test_store();
        store
            .put_college(&create_test_college("hunter", true))
            .await
            .unwrap();
        store
            .put_college(&create_test_college("baruch", false))
            .await
            .unwrap();

        let pending = store.list_pending_colleges().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "baruch");

        store
            .set_college_approved(&pending[0].id, true)
            .await
            .unwrap();
        assert!(store.list_pending_colleges().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn college_total_and_delete() {
        let (store, _dir) = create_test_store();
        let college = create_test_college("hunter", true);
        store.put_college(&college).await.unwrap();

        store.increment_college_total(&college.id, 3).await.unwrap();
        store.increment_college_total(&college.id, -1).await.unwrap();
        let stored = store.get_college(&college.id).await.unwrap().unwrap();
        assert_eq!(stored.approved_syllabi_total, 2);

        store.delete_college(&college.id).await.unwrap();
        assert!(store.get_college(&college.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_college(&college.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn global_total_merge_creates_singleton() {
        let (store, _dir) = create_test_store();
        assert!(store.get_global_stats().await.unwrap().is_none());

        let stats = store.increment_global_total(1).await.unwrap();
        assert_eq!(stats.total_syllabi, 1);
        assert!(stats.updated_at.is_some());

        store.increment_global_total(1).await.unwrap();
        let stats = store.get_global_stats().await.unwrap().unwrap();
        assert_eq!(stats.total_syllabi, 2);
    }

    #[tokio::test]
    async fn user_profile_roundtrip() {
        let (store, _dir) = create_test_store();
        let uid = Uid::new("u1").unwrap();
        assert!(store.get_user_profile(&uid).await.unwrap().is_none());

        let profile = UserProfile {
            email: Some("u1@example.com".to_string()),
            wants_email_notifications: true,
        };
        store.put_user_profile(&uid, &profile).await.unwrap();
        assert_eq!(store.get_user_profile(&uid).await.unwrap(), Some(profile));
    }
}

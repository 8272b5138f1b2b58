//! Moderation service implementation.
//!
//! This module provides the `Moderation` trait and the `ModerationService`
//! implementation that runs the admin actions against the document and blob
//! stores.

use std::sync::Arc;

use async_trait::async_trait;
use syllabusdb_core::{CollegeId, SyllabusId, SyllabusRef, Uid};
use syllabusdb_store::{BlobStore, DocumentStore, Syllabus};

use crate::error::{ControlError, Result};
use crate::gate::AdminSession;
use crate::loader;
use crate::messages::{self, Message};
use crate::outbound::{OutboundQueue, OutboundTask};
use crate::prompt::{usable_reason, Prompt};
use crate::saga::{Saga, Step};
use crate::scanner::ScanResult;
use crate::types::{AbortReason, ModerationConfig, Outcome, PendingItems};

/// Trait defining the admin moderation operations.
///
/// Every operation takes an [`AdminSession`], so none can run before the
/// caller passed the admin gate.
#[async_trait]
pub trait Moderation: Send + Sync {
    /// Fetch every pending syllabus and college request.
    ///
    /// # Errors
    ///
    /// Returns an error if a store query fails.
    async fn load_pending(&self, session: &AdminSession) -> Result<PendingItems>;

    /// Get one syllabus record.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus doesn't exist.
    async fn get_syllabus(&self, session: &AdminSession, syllabus: &SyllabusRef)
        -> Result<Syllabus>;

    /// Approve a pending syllabus and bump the course, college, and global
    /// counters. An already approved syllabus aborts without writes.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus doesn't exist, or
    /// `ControlError::SagaFailed` if a write fails part way.
    async fn approve_syllabus(
        &self,
        session: &AdminSession,
        syllabus: &SyllabusRef,
        owner: &Uid,
        prompt: &dyn Prompt,
    ) -> Result<Outcome>;

    /// Reject a pending syllabus: delete its PDF and record, and the course
    /// when it was the last syllabus. The record is re-read first; an
    /// approved one is left alone.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus no longer exists, or
    /// `ControlError::SagaFailed` if a write fails part way.
    async fn disapprove_syllabus(
        &self,
        session: &AdminSession,
        syllabus: &Syllabus,
        prompt: &dyn Prompt,
    ) -> Result<Outcome>;

    /// Approve a pending college request.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the college doesn't exist.
    async fn approve_college(
        &self,
        session: &AdminSession,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome>;

    /// Reject a pending college request by deleting it.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the college doesn't exist.
    async fn disapprove_college(
        &self,
        session: &AdminSession,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome>;

    /// Queue a safety scan of a syllabus PDF.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus doesn't exist.
    async fn request_scan(&self, session: &AdminSession, syllabus: &SyllabusRef) -> Result<()>;

    /// The latest scan result for a syllabus, if one was requested.
    fn scan_result(&self, session: &AdminSession, syllabus_id: &SyllabusId) -> Option<ScanResult>;
}

/// The main moderation service implementation.
pub struct ModerationService<S: DocumentStore, B: BlobStore> {
    store: Arc<S>,
    blobs: Arc<B>,
    outbound: OutboundQueue,
    config: ModerationConfig,
}

impl<S: DocumentStore, B: BlobStore> ModerationService<S, B> {
    /// Create a new moderation service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        blobs: Arc<B>,
        outbound: OutboundQueue,
        config: ModerationConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            outbound,
            config,
        }
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the blob store.
    #[must_use]
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Get the outbound queue.
    #[must_use]
    pub const fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Queue `message` for `owner` if they opted in and have an email on file.
    ///
    /// Best effort: a failed profile read is logged and swallowed.
    async fn notify_owner(&self, owner: &Uid, message: Message) {
        let profile = match self.store.get_user_profile(owner).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Could not read profile for notification");
                return;
            }
        };

        match profile.as_ref().and_then(|p| p.notification_email()) {
            Some(email) => {
                tracing::debug!(owner = %owner, "Queued notification");
                self.outbound.enqueue(OutboundTask::notify(message.to(email)));
            }
            None => {
                tracing::debug!(owner = %owner, "Owner has not opted in to notifications");
            }
        }
    }

    /// Ask for a reason, then a confirmation. `Err` carries the abort reason.
    async fn reason_and_confirm(
        prompt: &dyn Prompt,
        reason_question: &str,
        confirm_question: &str,
    ) -> std::result::Result<String, AbortReason> {
        let reason = usable_reason(prompt.reason(reason_question).await)
            .ok_or(AbortReason::MissingReason)?;
        if !prompt.confirm(confirm_question).await {
            return Err(AbortReason::Declined);
        }
        Ok(reason)
    }
}

#[async_trait]
impl<S, B> Moderation for ModerationService<S, B>
where
    S: DocumentStore + 'static,
    B: BlobStore + 'static,
{
    async fn load_pending(&self, session: &AdminSession) -> Result<PendingItems> {
        tracing::debug!(admin = %session.identity().uid, "Loading pending items");
        loader::load_pending(self.store.as_ref()).await
    }

    async fn get_syllabus(
        &self,
        _session: &AdminSession,
        syllabus: &SyllabusRef,
    ) -> Result<Syllabus> {
        self.store
            .get_syllabus(syllabus)
            .await?
            .ok_or_else(|| ControlError::NotFound(syllabus.to_string()))
    }

    async fn approve_syllabus(
        &self,
        session: &AdminSession,
        syllabus: &SyllabusRef,
        owner: &Uid,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        if !prompt
            .confirm(&format!("Approve syllabus {syllabus}?"))
            .await
        {
            tracing::info!(syllabus = %syllabus, "Approval declined");
            return Ok(Outcome::Aborted(AbortReason::Declined));
        }

        let store = self.store.as_ref();
        let record = store
            .get_syllabus(syllabus)
            .await?
            .ok_or_else(|| ControlError::NotFound(syllabus.to_string()))?;
        if record.approved {
            tracing::info!(syllabus = %syllabus, "Syllabus already approved");
            return Ok(Outcome::Aborted(AbortReason::AlreadyApproved));
        }

        let course_ref = &syllabus.course();
        let course = store.get_course(course_ref).await?;
        let previously_approved = course.as_ref().is_some_and(|c| c.approved);
        let course_code = course
            .as_ref()
            .map_or_else(|| course_ref.course_id.to_string(), |c| c.code.clone());
        let college_id = &syllabus.college_id;

        Saga::new("approve-syllabus")
            .step(
                Step::new("syllabus-approved", || async move {
                    store.set_syllabus_approved(syllabus, true).await?;
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    store.set_syllabus_approved(syllabus, false).await?;
                    Ok::<_, ControlError>(())
                }),
            )
            .step(
                Step::new("course-approval", || async move {
                    store.update_course_approval(course_ref, true, 1).await?;
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    store
                        .update_course_approval(course_ref, previously_approved, -1)
                        .await?;
                    Ok::<_, ControlError>(())
                }),
            )
            .step(
                Step::new("college-total", || async move {
                    store.increment_college_total(college_id, 1).await?;
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    store.increment_college_total(college_id, -1).await?;
                    Ok::<_, ControlError>(())
                }),
            )
            .step(
                Step::new("global-total", || async move {
                    store.increment_global_total(1).await?;
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    store.increment_global_total(-1).await?;
                    Ok::<_, ControlError>(())
                }),
            )
            .run()
            .await?;

        tracing::info!(
            admin = %session.identity().uid,
            syllabus = %syllabus,
            "Approved syllabus"
        );

        self.notify_owner(
            owner,
            messages::syllabus_approved(&course_code, &self.config.site_url),
        )
        .await;

        Ok(Outcome::Applied)
    }

    async fn disapprove_syllabus(
        &self,
        session: &AdminSession,
        syllabus: &Syllabus,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let reference = syllabus.reference();
        let reason = match Self::reason_and_confirm(
            prompt,
            &format!("Why is syllabus {reference} being rejected?"),
            &format!("Delete syllabus {reference} and its PDF?"),
        )
        .await
        {
            Ok(reason) => reason,
            Err(abort) => {
                tracing::info!(syllabus = %reference, ?abort, "Disapproval aborted");
                return Ok(Outcome::Aborted(abort));
            }
        };

        let store = self.store.as_ref();
        let blobs = self.blobs.as_ref();

        // Act on the stored record, not the caller's copy.
        let current = store
            .get_syllabus(&reference)
            .await?
            .ok_or_else(|| ControlError::NotFound(reference.to_string()))?;
        if current.approved {
            tracing::info!(syllabus = %reference, "Syllabus already approved, not deleting");
            return Ok(Outcome::Aborted(AbortReason::AlreadyApproved));
        }
        let syllabus = &current;

        let file_path = syllabus.file_path.as_str();
        let course_ref = syllabus.course_ref();

        // Snapshots for compensation and the message.
        let pdf = blobs.get(file_path).await?;
        let course = store.get_course(&course_ref).await?;
        let course_code = course
            .as_ref()
            .map_or_else(|| course_ref.course_id.to_string(), |c| c.code.clone());
        let reference = &reference;
        let course_ref = &course_ref;
        let pdf = &pdf;
        let course = &course;

        Saga::new("disapprove-syllabus")
            .step(
                Step::new("delete-pdf", || async move {
                    if !blobs.delete(file_path).await? {
                        tracing::debug!(file_path, "PDF already deleted");
                    }
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    if let Some(bytes) = pdf {
                        blobs.put(file_path, bytes).await?;
                    }
                    Ok::<_, ControlError>(())
                }),
            )
            .step(
                Step::new("delete-syllabus", || async move {
                    store.delete_syllabus(reference).await?;
                    Ok::<_, ControlError>(())
                })
                .compensate_with(|| async move {
                    store.put_syllabus(syllabus).await?;
                    Ok::<_, ControlError>(())
                }),
            )
            .step(
                Step::new("cleanup-course", || async move {
                    let remaining = store.count_syllabi(course_ref).await?;
                    if remaining == 0 && course.is_some() {
                        store.delete_course(course_ref).await?;
                        tracing::info!(course = %course_ref, "Deleted empty course");
                    }
                    Ok::<_, ControlError>(())
                }),
            )
            .run()
            .await?;

        tracing::info!(
            admin = %session.identity().uid,
            syllabus = %reference,
            "Disapproved syllabus"
        );

        self.notify_owner(
            &syllabus.owner,
            messages::syllabus_disapproved(&course_code, &reason, &self.config.site_url),
        )
        .await;

        Ok(Outcome::Applied)
    }

    async fn approve_college(
        &self,
        session: &AdminSession,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        if !prompt
            .confirm(&format!("Approve college request {college_id}?"))
            .await
        {
            tracing::info!(college_id = %college_id, "College approval declined");
            return Ok(Outcome::Aborted(AbortReason::Declined));
        }

        let college = self
            .store
            .get_college(college_id)
            .await?
            .ok_or_else(|| ControlError::NotFound(format!("colleges/{college_id}")))?;

        self.store.set_college_approved(college_id, true).await?;

        tracing::info!(
            admin = %session.identity().uid,
            college_id = %college_id,
            "Approved college"
        );

        self.notify_owner(
            &college.owner,
            messages::college_approved(&college.name, &self.config.site_url),
        )
        .await;

        Ok(Outcome::Applied)
    }

    async fn disapprove_college(
        &self,
        session: &AdminSession,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let reason = match Self::reason_and_confirm(
            prompt,
            &format!("Why is college request {college_id} being rejected?"),
            &format!("Delete college request {college_id}?"),
        )
        .await
        {
            Ok(reason) => reason,
            Err(abort) => {
                tracing::info!(college_id = %college_id, ?abort, "College disapproval aborted");
                return Ok(Outcome::Aborted(abort));
            }
        };

        let college = self
            .store
            .get_college(college_id)
            .await?
            .ok_or_else(|| ControlError::NotFound(format!("colleges/{college_id}")))?;

        // Child courses are not touched.
        self.store.delete_college(college_id).await?;

        tracing::info!(
            admin = %session.identity().uid,
            college_id = %college_id,
            "Disapproved college"
        );

        self.notify_owner(
            &college.owner,
            messages::college_disapproved(&college.name, &reason),
        )
        .await;

        Ok(Outcome::Applied)
    }

    async fn request_scan(&self, session: &AdminSession, syllabus: &SyllabusRef) -> Result<()> {
        let record = self.get_syllabus(session, syllabus).await?;
        tracing::info!(syllabus = %syllabus, "Queued PDF scan");
        self.outbound
            .enqueue(OutboundTask::scan(record.id, record.pdf_url));
        Ok(())
    }

    fn scan_result(&self, _session: &AdminSession, syllabus_id: &SyllabusId) -> Option<ScanResult> {
        self.outbound.scan_cache().get(syllabus_id)
    }
}

//! An admin's working view of the moderation queue.
//!
//! A [`ModerationDesk`] holds one admin session and the pending list it was
//! shown. Approvals and college actions drop the item from the list locally.
//! A syllabus disapproval reloads the whole list from the store. An item
//! found already approved is treated as gone in both cases.

use std::sync::Arc;

use syllabusdb_core::{CollegeId, SyllabusRef};

use crate::error::{ControlError, Result};
use crate::gate::AdminSession;
use crate::prompt::Prompt;
use crate::service::Moderation;
use crate::types::{AbortReason, CollegeGroup, Outcome, PendingItems, PendingSyllabus};

/// A session-scoped pending list with the actions that change it.
pub struct ModerationDesk<M: Moderation> {
    service: Arc<M>,
    session: AdminSession,
    items: PendingItems,
}

impl<M: Moderation> ModerationDesk<M> {
    /// Open a desk and load the pending items.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub async fn open(service: Arc<M>, session: AdminSession) -> Result<Self> {
        let items = service.load_pending(&session).await?;
        Ok(Self {
            service,
            session,
            items,
        })
    }

    /// The session this desk acts for.
    #[must_use]
    pub const fn session(&self) -> &AdminSession {
        &self.session
    }

    /// Current pending items.
    #[must_use]
    pub const fn items(&self) -> &PendingItems {
        &self.items
    }

    /// Current pending syllabi grouped for display.
    #[must_use]
    pub fn groups(&self) -> Vec<CollegeGroup> {
        self.items.groups()
    }

    /// Replace the pending list with a fresh load.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub async fn reload(&mut self) -> Result<()> {
        self.items = self.service.load_pending(&self.session).await?;
        Ok(())
    }

    fn find_syllabus(&self, syllabus: &SyllabusRef) -> Result<&PendingSyllabus> {
        self.items
            .syllabi
            .iter()
            .find(|p| p.syllabus.reference() == *syllabus)
            .ok_or_else(|| ControlError::NotFound(syllabus.to_string()))
    }

    /// Approve a syllabus from the list.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus is not in the list,
    /// or the service error if the approval fails.
    pub async fn approve_syllabus(
        &mut self,
        syllabus: &SyllabusRef,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let owner = self.find_syllabus(syllabus)?.syllabus.owner.clone();
        let outcome = self
            .service
            .approve_syllabus(&self.session, syllabus, &owner, prompt)
            .await?;

        if matches!(
            outcome,
            Outcome::Applied | Outcome::Aborted(AbortReason::AlreadyApproved)
        ) {
            self.items
                .syllabi
                .retain(|p| p.syllabus.reference() != *syllabus);
        }
        Ok(outcome)
    }

    /// Disapprove a syllabus from the list, then reload.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the syllabus is not in the list,
    /// or the service error if the disapproval fails.
    pub async fn disapprove_syllabus(
        &mut self,
        syllabus: &SyllabusRef,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let record = self.find_syllabus(syllabus)?.syllabus.clone();
        let outcome = self
            .service
            .disapprove_syllabus(&self.session, &record, prompt)
            .await?;

        if matches!(
            outcome,
            Outcome::Applied | Outcome::Aborted(AbortReason::AlreadyApproved)
        ) {
            self.reload().await?;
        }
        Ok(outcome)
    }

    /// Approve a college request from the list.
    ///
    /// # Errors
    ///
    /// Returns the service error if the approval fails.
    pub async fn approve_college(
        &mut self,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let outcome = self
            .service
            .approve_college(&self.session, college_id, prompt)
            .await?;
        if outcome == Outcome::Applied {
            self.items.colleges.retain(|c| c.id != *college_id);
        }
        Ok(outcome)
    }

    /// Disapprove a college request from the list.
    ///
    /// # Errors
    ///
    /// Returns the service error if the disapproval fails.
    pub async fn disapprove_college(
        &mut self,
        college_id: &CollegeId,
        prompt: &dyn Prompt,
    ) -> Result<Outcome> {
        let outcome = self
            .service
            .disapprove_college(&self.session, college_id, prompt)
            .await?;
        if outcome == Outcome::Applied {
            self.items.colleges.retain(|c| c.id != *college_id);
        }
        Ok(outcome)
    }
}

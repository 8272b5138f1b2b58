//! Interactive walk through the pending queue.
//!
//! `sdb-admin review` keeps the pending list it was shown and works through
//! it one item at a time. Approvals and college decisions drop the item
//! locally; a syllabus rejection reloads the list, since the course may have
//! gone with it.

use std::collections::HashSet;

use syllabusdb_core::{CollegeId, SyllabusRef};
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::client::GatewayClient;
use crate::prompt::TerminalPrompt;
use crate::types::{College, Outcome, PendingResponse, PendingSyllabus};

/// Abort reason sent by the gateway when another admin got there first.
const ALREADY_APPROVED: &str = "already_approved";

/// Whether the item is no longer pending after `outcome`.
fn settled(outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Applied => true,
        Outcome::Aborted(reason) => reason == ALREADY_APPROVED,
    }
}

/// The pending list as last shown, minus skipped items.
pub struct ReviewList {
    pending: PendingResponse,
    skipped: HashSet<String>,
}

impl ReviewList {
    /// Wrap a freshly loaded pending list.
    pub fn new(pending: PendingResponse) -> Self {
        Self {
            pending,
            skipped: HashSet::new(),
        }
    }

    /// Replace the list, keeping what was skipped.
    pub fn replace(&mut self, pending: PendingResponse) {
        self.pending = pending;
    }

    /// Next syllabus not yet skipped, in display order.
    pub fn next_syllabus(&self) -> Option<&PendingSyllabus> {
        self.pending
            .groups
            .iter()
            .flat_map(|college| &college.owners)
            .flat_map(|owner| &owner.syllabi)
            .find(|item| !self.skipped.contains(&item.syllabus.path()))
    }

    /// Next college request not yet skipped.
    pub fn next_college(&self) -> Option<&College> {
        self.pending
            .colleges
            .iter()
            .find(|c| !self.skipped.contains(&format!("colleges/{}", c.id)))
    }

    /// Leave `path` for later.
    pub fn skip(&mut self, path: String) {
        self.skipped.insert(path);
    }

    /// Drop a syllabus, and any group it leaves empty.
    pub fn remove_syllabus(&mut self, path: &str) {
        for college in &mut self.pending.groups {
            for owner in &mut college.owners {
                owner.syllabi.retain(|item| item.syllabus.path() != path);
            }
            college.owners.retain(|owner| !owner.syllabi.is_empty());
        }
        self.pending.groups.retain(|college| !college.owners.is_empty());
    }

    /// Drop a college request.
    pub fn remove_college(&mut self, id: &str) {
        self.pending.colleges.retain(|c| c.id != id);
    }
}

/// Work through the queue until it is empty or the admin quits.
///
/// # Errors
///
/// Returns an error if a gateway call or the terminal fails.
pub async fn run<R, W>(client: &GatewayClient, prompt: &mut TerminalPrompt<R, W>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut list = ReviewList::new(client.pending().await?);

    while let Some(item) = list.next_syllabus().cloned() {
        let path = item.syllabus.path();
        let reference: SyllabusRef = path.parse()?;
        let s = &item.syllabus;
        println!(
            "{} {} at {} - {} {} {}",
            item.course_code, item.course_title, item.college_name, s.professor, s.term, s.year
        );
        println!("  {}", s.pdf_url);

        match choose(prompt).await?.as_str() {
            "a" => {
                let confirm = prompt.confirm(&format!("Approve syllabus {path}?")).await?;
                let outcome = client
                    .approve_syllabus(&reference, Some(s.owner.clone()), confirm)
                    .await?;
                report(&outcome, &path);
                if settled(&outcome) {
                    list.remove_syllabus(&path);
                } else {
                    list.skip(path);
                }
            }
            "r" => {
                let reason = prompt
                    .reason(&format!("Why is {path} being rejected?"))
                    .await?
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                let Some(reason) = reason else {
                    println!("Aborted: a reason is required");
                    list.skip(path);
                    continue;
                };
                let confirm = prompt
                    .confirm(&format!("Delete syllabus {path} and its PDF?"))
                    .await?;
                let outcome = client
                    .disapprove_syllabus(&reference, Some(reason), confirm)
                    .await?;
                report(&outcome, &path);
                if settled(&outcome) {
                    list.replace(client.pending().await?);
                } else {
                    list.skip(path);
                }
            }
            "q" => return Ok(()),
            _ => list.skip(path),
        }
    }

    while let Some(college) = list.next_college().cloned() {
        println!(
            "College request {} - {}, {}, {} (requested by {})",
            college.id, college.name, college.city, college.state, college.owner
        );
        let id: CollegeId = college.id.parse()?;

        let outcome = match choose(prompt).await?.as_str() {
            "a" => {
                let confirm = prompt
                    .confirm(&format!("Approve college request {id}?"))
                    .await?;
                client.approve_college(&id, confirm).await?
            }
            "r" => {
                let reason = prompt
                    .reason(&format!("Why is college {id} being rejected?"))
                    .await?
                    .filter(|r| !r.trim().is_empty());
                if reason.is_none() {
                    println!("Aborted: a reason is required");
                    list.skip(format!("colleges/{id}"));
                    continue;
                }
                let confirm = prompt
                    .confirm(&format!("Delete college request {id}?"))
                    .await?;
                client.disapprove_college(&id, reason, confirm).await?
            }
            "q" => return Ok(()),
            _ => {
                list.skip(format!("colleges/{id}"));
                continue;
            }
        };

        report(&outcome, &format!("colleges/{id}"));
        if settled(&outcome) {
            list.remove_college(&college.id);
        } else {
            list.skip(format!("colleges/{id}"));
        }
    }

    println!("Nothing left to review.");
    Ok(())
}

/// Ask for an action. End of input quits.
async fn choose<R, W>(prompt: &mut TerminalPrompt<R, W>) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    Ok(prompt
        .reason("[a]pprove, [r]eject, [s]kip, [q]uit?")
        .await?
        .map_or_else(|| "q".to_string(), |a| a.trim().to_ascii_lowercase()))
}

fn report(outcome: &Outcome, path: &str) {
    match outcome {
        Outcome::Applied => println!("Done: {path}"),
        Outcome::Aborted(reason) => println!("Aborted {path}: {reason}"),
    }
}

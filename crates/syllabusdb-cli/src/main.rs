//! SyllabusDB admin CLI.
//!
//! This is the entry point for the `sdb-admin` binary. Confirmations and
//! reasons are asked on the terminal, then sent to the gateway with the
//! action.

mod client;
mod prompt;
mod review;
mod types;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use syllabusdb_core::{CollegeId, SyllabusId, SyllabusRef};

use client::GatewayClient;
use prompt::TerminalPrompt;
use types::{Outcome, PendingResponse, ScanResult};

/// SyllabusDB admin CLI - review pending uploads and college requests.
#[derive(Parser, Debug)]
#[command(name = "sdb-admin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ID token for authentication.
    #[arg(long, env = "SYLLABUSDB_TOKEN", hide_env_values = true)]
    token: String,

    /// Gateway URL.
    #[arg(
        long,
        env = "SYLLABUSDB_GATEWAY",
        default_value = "http://localhost:8080"
    )]
    gateway: String,

    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    yes: bool,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List pending syllabi and college requests.
    Pending,
    /// Walk through the pending queue, deciding one item at a time.
    Review,
    /// Approve a syllabus.
    ApproveSyllabus {
        /// Syllabus path: colleges/<college>/courses/<course>/syllabi/<id>.
        path: SyllabusRef,
        /// Uploader to notify. Read from the record when omitted.
        #[arg(long)]
        owner: Option<String>,
    },
    /// Reject a syllabus and delete its PDF.
    DisapproveSyllabus {
        /// Syllabus path: colleges/<college>/courses/<course>/syllabi/<id>.
        path: SyllabusRef,
    },
    /// Approve a college request.
    ApproveCollege {
        /// College id.
        college: CollegeId,
    },
    /// Reject a college request.
    DisapproveCollege {
        /// College id.
        college: CollegeId,
    },
    /// Queue a safety scan of a syllabus PDF.
    Scan {
        /// Syllabus path: colleges/<college>/courses/<course>/syllabi/<id>.
        path: SyllabusRef,
    },
    /// Show the latest scan result of a syllabus.
    ScanResult {
        /// Syllabus id.
        syllabus: SyllabusId,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("syllabusdb_cli=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let client = GatewayClient::new(&args.gateway, &args.token)?;
    let mut prompt = TerminalPrompt::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        args.yes,
    );

    match args.command {
        Command::Pending => {
            let pending = client.pending().await.context("loading pending items")?;
            print_pending(&pending);
        }
        Command::Review => review::run(&client, &mut prompt).await?,
        Command::ApproveSyllabus { path, owner } => {
            let confirm = prompt.confirm(&format!("Approve syllabus {path}?")).await?;
            let outcome = client.approve_syllabus(&path, owner, confirm).await?;
            report(&outcome, &format!("Approved {path}"));
        }
        Command::DisapproveSyllabus { path } => {
            let Some(reason) = ask_reason(&mut prompt, &format!("Why is {path} being rejected?")).await?
            else {
                println!("Aborted: a reason is required");
                return Ok(());
            };
            let confirm = prompt
                .confirm(&format!("Delete syllabus {path} and its PDF?"))
                .await?;
            let outcome = client
                .disapprove_syllabus(&path, Some(reason), confirm)
                .await?;
            report(&outcome, &format!("Rejected {path}"));
        }
        Command::ApproveCollege { college } => {
            let confirm = prompt
                .confirm(&format!("Approve college request {college}?"))
                .await?;
            let outcome = client.approve_college(&college, confirm).await?;
            report(&outcome, &format!("Approved college {college}"));
        }
        Command::DisapproveCollege { college } => {
            let Some(reason) =
                ask_reason(&mut prompt, &format!("Why is college {college} being rejected?")).await?
            else {
                println!("Aborted: a reason is required");
                return Ok(());
            };
            let confirm = prompt
                .confirm(&format!("Delete college request {college}?"))
                .await?;
            let outcome = client
                .disapprove_college(&college, Some(reason), confirm)
                .await?;
            report(&outcome, &format!("Rejected college {college}"));
        }
        Command::Scan { path } => {
            client.request_scan(&path).await?;
            println!("Scan queued for {path}");
        }
        Command::ScanResult { syllabus } => {
            let result = client.scan_result(&syllabus).await?;
            print_scan(&syllabus, &result);
        }
    }

    Ok(())
}

/// Ask for a reason; empty and whitespace-only answers count as none.
async fn ask_reason<R, W>(
    prompt: &mut TerminalPrompt<R, W>,
    question: &str,
) -> anyhow::Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    Ok(prompt
        .reason(question)
        .await?
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty()))
}

fn report(outcome: &Outcome, applied: &str) {
    match outcome {
        Outcome::Applied => println!("{applied}"),
        Outcome::Aborted(reason) => println!("Aborted: {reason}"),
    }
}

fn print_pending(pending: &PendingResponse) {
    if pending.groups.is_empty() {
        println!("No pending syllabi.");
    }
    for college in &pending.groups {
        println!("{} ({})", college.college_name, college.college_id);
        for owner in &college.owners {
            println!("  uploaded by {}", owner.owner);
            for item in &owner.syllabi {
                let s = &item.syllabus;
                let uploaded = s
                    .created_at
                    .map_or_else(|| "unknown date".to_string(), |t| t.format("%Y-%m-%d").to_string());
                println!(
                    "    {} {} - {} {} {} ({uploaded})",
                    item.course_code, item.course_title, s.professor, s.term, s.year
                );
                println!("      {}", s.path());
                println!("      {}", s.pdf_url);
            }
        }
    }

    if pending.colleges.is_empty() {
        println!("No pending college requests.");
    } else {
        println!("College requests:");
        for college in &pending.colleges {
            println!(
                "  {} - {}, {}, {} (requested by {})",
                college.id, college.name, college.city, college.state, college.owner
            );
        }
    }
}

fn print_scan(syllabus: &SyllabusId, result: &ScanResult) {
    match result {
        ScanResult::Pending => println!("{syllabus}: scan in progress"),
        ScanResult::Failed { error } => println!("{syllabus}: scan failed: {error}"),
        ScanResult::Complete { verdict } => {
            let flag = if verdict.malicious > 0 || verdict.suspicious > 0 {
                "FLAGGED"
            } else {
                "clean"
            };
            println!(
                "{syllabus}: {flag} (malicious {}, suspicious {}, harmless {}, undetected {}, timeout {})",
                verdict.malicious,
                verdict.suspicious,
                verdict.harmless,
                verdict.undetected,
                verdict.timeout
            );
        }
    }
}

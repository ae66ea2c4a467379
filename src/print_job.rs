use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::process::Command;

use crate::mqtt::topics::Topics;
use crate::mqtt::{publish_all, Bus, Publication, PAYLOAD_OFF, PAYLOAD_ON};

/// Exit code the collector script uses to report an empty paper roll.
const OUT_OF_PAPER_EXIT_CODE: i32 = 2;

/// Shell command wrapping the external feed collector/printer script.
#[derive(Debug, Clone)]
pub struct PrintScript {
    command: String,
}

impl PrintScript {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Runs the script to completion. May take an unbounded amount of time
    /// (network fetch + physical print); no timeout is imposed here.
    pub async fn run(&self) -> std::io::Result<ExitStatus> {
        Command::new("sh").arg("-c").arg(&self.command).status().await
    }
}

/// Final classification of one print job. The script's exit status is the
/// sole signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    OutOfPaper,
    Failed,
}

impl JobOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => JobOutcome::Success,
            Some(OUT_OF_PAPER_EXIT_CODE) => JobOutcome::OutOfPaper,
            // Any other exit code, or termination by signal.
            _ => JobOutcome::Failed,
        }
    }
}

/// The Idle/Running flag shared between the command dispatcher and a running
/// job. The only state mutated from two concurrent contexts.
#[derive(Debug, Clone, Default)]
pub struct JobSlot {
    running: Arc<AtomicBool>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot. Returns `None` while another job holds it, so
    /// overlapping start commands cannot launch a second job.
    pub fn try_start(&self) -> Option<JobPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobPermit {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Returns the slot to Idle when dropped, whatever the job's outcome.
#[derive(Debug)]
pub struct JobPermit {
    running: Arc<AtomicBool>,
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// State publishes owed for a finished job.
///
/// Success clears both problem flags; out-of-paper raises only the paper
/// flag and leaves the error state untouched; any other failure raises only
/// the error flag and leaves the paper state untouched.
pub fn outcome_publications(outcome: JobOutcome, topics: &Topics) -> Vec<Publication> {
    match outcome {
        JobOutcome::Success => vec![
            Publication::transient(&topics.paper_state, PAYLOAD_OFF),
            Publication::transient(&topics.error_state, PAYLOAD_OFF),
        ],
        JobOutcome::OutOfPaper => vec![Publication::transient(&topics.paper_state, PAYLOAD_ON)],
        JobOutcome::Failed => vec![Publication::transient(&topics.error_state, PAYLOAD_ON)],
    }
}

/// Runs one accepted print command to completion and reports the result.
///
/// Spawned on its own task so the dispatch path never blocks on the script.
/// One-shot: no retries, no cancellation.
pub async fn run_print_job<B: Bus>(
    bus: B,
    topics: Arc<Topics>,
    script: PrintScript,
    permit: JobPermit,
) {
    log::info!("Updating printer state with (on)");
    publish_all(&bus, &[Publication::transient(&topics.printer_state, PAYLOAD_ON)]).await;

    log::info!("Printing...");
    let outcome = match script.run().await {
        Ok(status) => {
            log::info!("Printing done (exit code {:?})", status.code());
            JobOutcome::from_status(status)
        }
        Err(err) => {
            log::error!("Could not run the print script: {}", err);
            JobOutcome::Failed
        }
    };

    // Unconditional: the printer must never be left showing "on" after a job.
    log::info!("Updating printer state with (off)");
    publish_all(&bus, &[Publication::transient(&topics.printer_state, PAYLOAD_OFF)]).await;

    publish_all(&bus, &outcome_publications(outcome, &topics)).await;

    drop(permit);
}

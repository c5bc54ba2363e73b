//! The dispatch pipeline: mail each client their edited picks, or serialize
//! the messages for inspection in a dry run.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use lettre::message::Mailbox;
use serde::Serialize;

use crate::error::{Result, WorkflowError};
use crate::mail::{self, Delivery, FrameAttachment, MessageSink};
use crate::naming::{self, CaseMatching, FrameKind};
use crate::prompt::SendGate;
use crate::roster::{self, Recipient};
use crate::staging;

/// Inputs for one dispatch run.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Directory holding the rendered frames (and, by default, the roster).
    pub input_dir: PathBuf,
    /// Directory for serialized messages; only used, and only prepared, in
    /// dry runs.
    pub output_dir: PathBuf,
    /// Explicit roster path; `None` discovers the unique `.csv` in `input_dir`.
    pub roster: Option<PathBuf>,
    pub sender: String,
    /// `true` hands messages to the sink as live sends; `false` is a dry run.
    pub transmit: bool,
    pub matching: CaseMatching,
    /// Provider the sender must belong to.
    pub provider_domain: String,
}

/// How one recipient's message ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Stored { path: PathBuf },
    Failed { reason: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct RecipientOutcome {
    pub email: String,
    pub attachments: usize,
    pub status: DeliveryStatus,
}

/// What a dispatch run did.
#[derive(Debug, Serialize)]
pub struct DispatchSummary {
    pub roster: PathBuf,
    pub recipients: usize,
    /// Rendered frames on disk that no recipient selected.
    pub orphans: Vec<String>,
    /// True when the operator declined the confirmation gate.
    pub cancelled: bool,
    pub outcomes: Vec<RecipientOutcome>,
}

impl DispatchSummary {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, DeliveryStatus::Failed { .. }))
            .count()
    }
}

struct ResolvedFrame {
    file_name: String,
    path: PathBuf,
}

/// One recipient with every pick resolved on disk.
struct Resolution {
    email: String,
    mailbox: Mailbox,
    frames: Vec<ResolvedFrame>,
}

/// Mail every recipient their picks, in roster order.
///
/// All validation (sender, roster, addresses, frame names, files on disk)
/// completes before the gate is consulted and before anything is handed to
/// the sink. Per-recipient sink failures are collected into the summary
/// rather than aborting the remaining deliveries.
pub fn run_dispatch(
    config: &DispatchConfig,
    sink: &dyn MessageSink,
    gate: &dyn SendGate,
) -> Result<DispatchSummary> {
    let sender = mail::validate_sender(&config.sender, &config.provider_domain)?;
    let roster_path = roster::resolve_roster_path(config.roster.as_deref(), &config.input_dir)?;
    if !config.transmit {
        staging::prepare_output_dir(&config.output_dir)?;
    }

    let recipients = roster::load_roster(&roster_path)?;
    let resolutions = resolve_recipients(&recipients, config)?;

    let orphans = find_orphans(&resolutions, config)?;
    if !orphans.is_empty() {
        tracing::warn!(
            "{} rendered frame(s) in {} selected by nobody: {}",
            orphans.len(),
            config.input_dir.display(),
            orphans.join(", ")
        );
    }

    let mut summary = DispatchSummary {
        roster: roster_path,
        recipients: resolutions.len(),
        orphans,
        cancelled: false,
        outcomes: Vec::new(),
    };

    if config.transmit && !resolutions.is_empty() {
        let prompt = format!(
            "Send {} message(s) from {}?",
            resolutions.len(),
            config.sender
        );
        if !gate.confirm(&prompt)? {
            tracing::info!("dispatch cancelled at the confirmation gate");
            summary.cancelled = true;
            return Ok(summary);
        }
    }

    for resolution in resolutions {
        summary.outcomes.push(deliver_one(&sender, resolution, sink));
    }
    Ok(summary)
}

fn resolve_recipients(
    recipients: &[Recipient],
    config: &DispatchConfig,
) -> Result<Vec<Resolution>> {
    let mut resolutions = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let mailbox = mail::recipient_mailbox(&recipient.email)?;
        let mut frames = Vec::with_capacity(recipient.picks.len());
        for pick in &recipient.picks {
            let name = naming::normalize(pick, FrameKind::Rendered);
            naming::validate(&name, FrameKind::Rendered, config.matching)?;
            let path = naming::resolve(&name, &config.input_dir, config.matching)?;
            let file_name = path
                .file_name()
                .and_then(|base| base.to_str())
                .unwrap_or(&name)
                .to_string();
            frames.push(ResolvedFrame { file_name, path });
        }
        resolutions.push(Resolution {
            email: recipient.email.clone(),
            mailbox,
            frames,
        });
    }
    Ok(resolutions)
}

fn find_orphans(resolutions: &[Resolution], config: &DispatchConfig) -> Result<Vec<String>> {
    let on_disk = naming::scan_rendered(&config.input_dir, config.matching)?;
    let referenced: BTreeSet<&str> = resolutions
        .iter()
        .flat_map(|resolution| &resolution.frames)
        .map(|frame| frame.file_name.as_str())
        .collect();
    Ok(on_disk
        .into_iter()
        .filter(|name| !referenced.contains(name.as_str()))
        .collect())
}

fn deliver_one(sender: &Mailbox, resolution: Resolution, sink: &dyn MessageSink) -> RecipientOutcome {
    let attachments = resolution.frames.len();
    let email = resolution.email;
    match compose_and_deliver(sender, &resolution.mailbox, &email, resolution.frames, sink) {
        Ok(Delivery::Sent) => {
            tracing::info!("sent {attachments} frame(s) to {email}");
            RecipientOutcome {
                email,
                attachments,
                status: DeliveryStatus::Sent,
            }
        }
        Ok(Delivery::Stored(path)) => {
            tracing::info!("wrote {}", path.display());
            RecipientOutcome {
                email,
                attachments,
                status: DeliveryStatus::Stored { path },
            }
        }
        Err(err) => {
            tracing::error!("delivery to {email} failed: {err}");
            RecipientOutcome {
                email,
                attachments,
                status: DeliveryStatus::Failed {
                    reason: err.to_string(),
                },
            }
        }
    }
}

fn compose_and_deliver(
    sender: &Mailbox,
    to: &Mailbox,
    email: &str,
    frames: Vec<ResolvedFrame>,
    sink: &dyn MessageSink,
) -> Result<Delivery> {
    let mut attachments = Vec::with_capacity(frames.len());
    for frame in frames {
        let bytes = fs::read(&frame.path)
            .map_err(|err| WorkflowError::io(format!("read {}", frame.path.display()), err))?;
        attachments.push(FrameAttachment {
            file_name: frame.file_name,
            bytes,
        });
    }
    let message = mail::compose(sender, to, attachments)?;
    sink.deliver(email, &message)
}

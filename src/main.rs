use anyhow::Result;
use clap::Parser;

use photo_takeout::cli::{Command, DispatchArgs, OrganizeArgs, RootArgs};
use photo_takeout::dispatch::{self, DeliveryStatus, DispatchConfig, DispatchSummary};
use photo_takeout::mail::{EmlWriter, MessageSink, SmtpMailer, PROVIDER_DOMAIN};
use photo_takeout::naming::CaseMatching;
use photo_takeout::organize::{self, OrganizeConfig};
use photo_takeout::prompt::{
    AssumeYes, CredentialSource, EnvCredential, SendGate, TerminalCredential, TerminalGate,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Organize(args) => cmd_organize(args),
        Command::Dispatch(args) => cmd_dispatch(args),
    }
}

fn cmd_organize(args: OrganizeArgs) -> Result<()> {
    let config = OrganizeConfig {
        input_dir: args.input,
        output_dir: args.output,
        roster: args.roster,
        picks: args.picks,
        matching: if args.any_case {
            CaseMatching::IgnoreCase
        } else {
            CaseMatching::Strict
        },
    };
    let summary = organize::run_organize(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Copied {} files to '{}'.",
            summary.copied,
            summary.output_dir.display()
        );
    }
    Ok(())
}

fn cmd_dispatch(args: DispatchArgs) -> Result<()> {
    let config = DispatchConfig {
        input_dir: args.input,
        output_dir: args.output,
        roster: args.roster,
        sender: args.sender,
        transmit: args.send,
        matching: if args.exact_case {
            CaseMatching::Strict
        } else {
            CaseMatching::IgnoreCase
        },
        provider_domain: PROVIDER_DOMAIN.to_string(),
    };

    let gate: Box<dyn SendGate> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalGate)
    };
    let sink: Box<dyn MessageSink> = if config.transmit {
        let credentials: Box<dyn CredentialSource> = if EnvCredential::available() {
            Box::new(EnvCredential)
        } else {
            Box::new(TerminalCredential)
        };
        let password = credentials.smtp_password(&config.sender)?;
        Box::new(SmtpMailer::new(&config.sender, password)?)
    } else {
        Box::new(EmlWriter::new(config.output_dir.clone()))
    };

    let summary = dispatch::run_dispatch(&config, sink.as_ref(), gate.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        report_dispatch(&summary);
    }

    let failed = summary.failed();
    if failed > 0 {
        anyhow::bail!("{failed} of {} deliveries failed", summary.outcomes.len());
    }
    Ok(())
}

fn report_dispatch(summary: &DispatchSummary) {
    if summary.cancelled {
        println!("Cancelled; no messages sent.");
        return;
    }
    for outcome in &summary.outcomes {
        match &outcome.status {
            DeliveryStatus::Sent => {
                println!("{}: sent {} attachment(s)", outcome.email, outcome.attachments);
            }
            DeliveryStatus::Stored { path } => {
                println!("{}: wrote {}", outcome.email, path.display());
            }
            DeliveryStatus::Failed { reason } => {
                println!("{}: FAILED ({reason})", outcome.email);
            }
        }
    }
    println!(
        "Dispatched {} of {} message(s).",
        summary.outcomes.len() - summary.failed(),
        summary.outcomes.len()
    );
}

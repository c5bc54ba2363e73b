//! Operator interaction: the send confirmation gate and SMTP credentials.
//!
//! Both are traits so tests can inject their own implementations; the
//! terminal-backed ones here are what the binary wires up.

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{Result, WorkflowError};

/// Environment variable consulted before prompting for the SMTP password.
pub const PASSWORD_ENV_VAR: &str = "TAKEOUT_SMTP_PASSWORD";

/// Last gate before messages leave the machine.
pub trait SendGate {
    /// Returns whether the operator approved; `false` cancels the run cleanly.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// y/N prompt on the controlling terminal. Declines when stdin is not a
/// terminal, so nothing is ever sent from an unattended pipeline by accident.
pub struct TerminalGate;

impl SendGate for TerminalGate {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            tracing::warn!("stdin is not a terminal; declining to send (pass --yes to override)");
            return Ok(false);
        }
        eprint!("{prompt} [y/N] ");
        io::stderr()
            .flush()
            .map_err(|err| WorkflowError::io("flush prompt", err))?;
        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .map_err(|err| WorkflowError::io("read confirmation", err))?;
        let answer = answer.trim().to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Gate wired by `--yes`: the operator already confirmed on the command line.
pub struct AssumeYes;

impl SendGate for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Source of the SMTP app password for live sends.
pub trait CredentialSource {
    fn smtp_password(&self, account: &str) -> Result<String>;
}

/// Password taken from [`PASSWORD_ENV_VAR`].
pub struct EnvCredential;

impl EnvCredential {
    pub fn available() -> bool {
        env::var_os(PASSWORD_ENV_VAR).is_some()
    }
}

impl CredentialSource for EnvCredential {
    fn smtp_password(&self, _account: &str) -> Result<String> {
        env::var(PASSWORD_ENV_VAR).map_err(|err| WorkflowError::MissingCredential {
            reason: format!("{PASSWORD_ENV_VAR}: {err}"),
        })
    }
}

/// Interactive prompt on stderr/stdin.
pub struct TerminalCredential;

impl CredentialSource for TerminalCredential {
    fn smtp_password(&self, account: &str) -> Result<String> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(WorkflowError::MissingCredential {
                reason: format!("stdin is not a terminal; set {PASSWORD_ENV_VAR}"),
            });
        }
        eprint!("App password for {account}: ");
        io::stderr()
            .flush()
            .map_err(|err| WorkflowError::io("flush prompt", err))?;
        let mut password = String::new();
        stdin
            .lock()
            .read_line(&mut password)
            .map_err(|err| WorkflowError::io("read password", err))?;
        Ok(password.trim_end_matches(['\r', '\n']).to_string())
    }
}

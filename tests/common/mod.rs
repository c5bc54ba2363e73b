//! Shared fixtures and stubs for the pipeline integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lettre::Message;
use photo_takeout::error::{Result, WorkflowError};
use photo_takeout::mail::{Delivery, MessageSink};
use photo_takeout::prompt::SendGate;
use tempfile::TempDir;

/// A temporary shoot: an input directory of frames plus room for outputs.
pub struct Studio {
    root: TempDir,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create studio");
        fs::create_dir(root.path().join("shoot")).expect("create shoot dir");
        Studio { root }
    }

    /// Directory containing the frames (and roster, if one is written).
    pub fn input(&self) -> PathBuf {
        self.root.path().join("shoot")
    }

    /// Path for an output directory; not created here.
    pub fn out(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub fn add_frame(&self, name: &str) {
        fs::write(self.input().join(name), format!("bytes-of-{name}")).expect("write frame");
    }

    /// Write a roster with the standard four columns; picks cells are quoted
    /// so their commas survive the CSV layer.
    pub fn write_roster(&self, file_name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let mut contents = String::from("shoot,date,email,picks\n");
        for (email, picks) in rows {
            contents.push_str(&format!("wedding,2024-05-01,{email},\"{picks}\"\n"));
        }
        let path = self.input().join(file_name);
        fs::write(&path, contents).expect("write roster");
        path
    }

    /// Sorted file names under `dir`.
    pub fn dir_names(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| {
                entry
                    .expect("entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// Sink that records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingSink {
    /// Refuse delivery for this address, to exercise failure collection.
    pub fail_for: Option<String>,
    pub deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub fn emails(&self) -> Vec<String> {
        self.deliveries
            .lock()
            .expect("lock")
            .iter()
            .map(|(email, _)| email.clone())
            .collect()
    }

    pub fn message_for(&self, email: &str) -> Option<String> {
        self.deliveries
            .lock()
            .expect("lock")
            .iter()
            .find(|(to, _)| to == email)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl MessageSink for RecordingSink {
    fn deliver(&self, email: &str, message: &Message) -> Result<Delivery> {
        if self.fail_for.as_deref() == Some(email) {
            return Err(WorkflowError::Mail {
                reason: "stub transport refused".to_string(),
            });
        }
        self.deliveries
            .lock()
            .expect("lock")
            .push((email.to_string(), message.formatted()));
        Ok(Delivery::Sent)
    }
}

/// Gate with a fixed answer that records the prompts it was shown.
pub struct StubGate {
    approve: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl StubGate {
    pub fn new(approve: bool) -> Self {
        StubGate {
            approve,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().expect("lock").len()
    }
}

impl SendGate for StubGate {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        Ok(self.approve)
    }
}

use std::path::{Path, PathBuf};

use splitflow_core::{PacketId, SessionCode};

/// Where the files of each session live. Every session owns the directory `<root>/<code>/`.
#[derive(Debug, Clone)]
pub struct SessionLayout {
    root: PathBuf,
}

impl SessionLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root of all sessions.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The session's directory.
    pub fn dir(&self, code: &SessionCode) -> PathBuf {
        self.root.join(code.as_str())
    }

    /// The plaintext the sender supplied.
    pub fn input(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join(format!("{code}_input.png"))
    }

    /// The ciphertext that gets routed.
    pub fn encrypted(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join("encrypted.bin")
    }

    /// The plaintext recovered for the receiver.
    pub fn output(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join(format!("{code}_output.png"))
    }

    /// The routing trace.
    pub fn log(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join(format!("{code}_log.txt"))
    }

    /// The frame sequence, as JSON.
    pub fn frames(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join(format!("{code}_frames.json"))
    }

    /// The topology in Graphviz format.
    pub fn dot(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join("VIZ.dot")
    }

    /// The directory holding one file per packet.
    pub fn packets_dir(&self, code: &SessionCode) -> PathBuf {
        self.dir(code).join("packets")
    }

    /// A single packet's file.
    pub fn packet(&self, code: &SessionCode, id: PacketId) -> PathBuf {
        self.packets_dir(code).join(format!("packet_{id}.bin"))
    }
}

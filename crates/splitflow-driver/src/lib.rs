//! Drives whole sessions: storing the sender's input, encrypting it, routing it, and later
//! recovering it for the receiver.

use std::fs;
use std::path::{Path, PathBuf};

use cipher_frontend::CipherService;
use log::{error, info};
use rayon::prelude::*;
use splitflow_core::{
    Bytes, Session, SessionCode, SessionOpts, SessionOutput, Traversal, DEFAULT_PACKET_SIZE,
};
use splitflow_utils::{FsStore, SessionLayout, Terminals};

pub mod session;

/// Per-run routing options.
#[derive(Debug, Clone, Copy, typed_builder::TypedBuilder)]
pub struct RouteOpts {
    #[builder(default = DEFAULT_PACKET_SIZE)]
    pub packet_size: Bytes,
    #[builder(default)]
    pub traversal: Traversal,
    /// Also write every packet to the session's `packets/` directory.
    #[builder(default)]
    pub save_packets: bool,
}

impl Default for RouteOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A graph, a cipher and the storage they share.
#[derive(Debug)]
pub struct Driver {
    terminals: Terminals,
    cipher: CipherService,
    store: FsStore,
}

impl Driver {
    pub fn new(terminals: Terminals, cipher: CipherService) -> Self {
        let store = FsStore::new(cipher.layout.clone());
        Self {
            terminals,
            cipher,
            store,
        }
    }

    pub fn layout(&self) -> &SessionLayout {
        self.store.layout()
    }

    /// Stores `input` as the plaintext of session `code` and routes it.
    pub fn send(
        &self,
        input: impl AsRef<Path>,
        code: &SessionCode,
        opts: RouteOpts,
    ) -> Result<SessionOutput, Error> {
        let layout = self.layout();
        fs::create_dir_all(layout.dir(code))?;
        fs::copy(input.as_ref(), layout.input(code))?;
        self.route(code, opts)
    }

    /// Routes a session whose plaintext is already stored.
    pub fn route(&self, code: &SessionCode, opts: RouteOpts) -> Result<SessionOutput, Error> {
        let Terminals {
            graph,
            source,
            sink,
        } = &self.terminals;
        let session_opts = SessionOpts::builder()
            .source(*source)
            .sink(*sink)
            .packet_size(opts.packet_size)
            .traversal(opts.traversal)
            .build();
        let session = Session::new(code.clone(), graph, session_opts);
        match splitflow_core::run(&session, &self.cipher, &self.store) {
            Ok(out) => {
                self.store.write_dot(code, graph).map_err(Error::Store)?;
                if opts.save_packets {
                    self.store
                        .save_packets(code, &out.packets)
                        .map_err(Error::Store)?;
                }
                info!(
                    "[{code}] routed {} packets over {} paths (max flow {})",
                    out.packets.len(),
                    out.flow.nr_paths(),
                    out.flow.value
                );
                Ok(out)
            }
            // Unroutable packets are still saved when asked for.
            Err(splitflow_core::Error::NoRoutablePath { packets }) if opts.save_packets => {
                self.store
                    .save_packets(code, &packets)
                    .map_err(Error::Store)?;
                Err(splitflow_core::Error::NoRoutablePath { packets }.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Routes independent sessions in parallel. Results are in the order of `codes`.
    pub fn batch(
        &self,
        codes: &[SessionCode],
        opts: RouteOpts,
    ) -> Vec<(SessionCode, Result<SessionOutput, Error>)> {
        codes
            .par_iter()
            .map(|code| {
                let res = self.route(code, opts);
                if let Err(e) = &res {
                    error!("[{code}] {e}");
                }
                (code.clone(), res)
            })
            .collect()
    }

    /// Decrypts a session's ciphertext and returns its published trace.
    pub fn receive(&self, code: &SessionCode) -> Result<Received, Error> {
        let layout = self.layout();
        if !layout.dir(code).is_dir() {
            return Err(Error::UnknownSession(code.clone()));
        }
        self.cipher.decrypt(code)?;
        let log = self.store.read_log(code).map_err(Error::Store)?;
        Ok(Received {
            output: layout.output(code),
            log,
        })
    }
}

/// What the receiver gets back.
#[derive(Debug, Clone)]
pub struct Received {
    /// The decrypted output file.
    pub output: PathBuf,
    /// The routing trace.
    pub log: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no session with code {0}")]
    UnknownSession(SessionCode),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("cipher failed")]
    Cipher(#[from] cipher_frontend::Error),

    #[error("failed to run session")]
    Session(#[from] splitflow_core::Error),

    #[error("storage error")]
    Store(#[source] anyhow::Error),
}

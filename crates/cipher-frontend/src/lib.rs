//! An interface to the cipher service that turns a session's input into the ciphertext that
//! gets routed, and back.
//!
//! The external cipher is a pair of executables: `encrypt <input> <session_dir>` writes
//! `encrypted.bin` into the session directory, and `decrypt <session_dir>` writes the
//! recovered output next to it.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use anyhow::Context;
use derivative::Derivative;
use log::{debug, info};
use splitflow_core::{ByteSource, SessionCode};
use splitflow_utils::SessionLayout;

/// A cipher service bound to a storage layout.
#[derive(Debug, typed_builder::TypedBuilder)]
pub struct CipherService {
    /// The directory containing the `encrypt` and `decrypt` executables.
    #[builder(setter(into), default = PathBuf::from("cryptlib"))]
    pub cipher_dir: PathBuf,
    /// Where session files live.
    pub layout: SessionLayout,
    /// Which cipher to use.
    #[builder(default)]
    pub kind: CipherKind,
}

impl CipherService {
    /// Encrypts the session's input into its `encrypted.bin`.
    pub fn encrypt(&self, code: &SessionCode) -> Result<CipherRun, Error> {
        let input = self.layout.input(code);
        let dir = self.layout.dir(code);
        let run = match self.kind {
            CipherKind::Noop => {
                fs::copy(&input, self.layout.encrypted(code))?;
                CipherRun::default()
            }
            CipherKind::External => self.invoke("encrypt", &[input.as_path(), dir.as_path()])?,
        };
        info!("[{code}] encrypted");
        Ok(run)
    }

    /// Decrypts the session's `encrypted.bin` into its output file.
    pub fn decrypt(&self, code: &SessionCode) -> Result<CipherRun, Error> {
        let dir = self.layout.dir(code);
        let run = match self.kind {
            CipherKind::Noop => {
                fs::copy(self.layout.encrypted(code), self.layout.output(code))?;
                CipherRun::default()
            }
            CipherKind::External => self.invoke("decrypt", &[dir.as_path()])?,
        };
        info!("[{code}] decrypted");
        Ok(run)
    }

    fn invoke(&self, program: &str, args: &[&Path]) -> Result<CipherRun, Error> {
        let program = self.cipher_dir.join(program);
        debug!("running {} {args:?}", program.display());
        let output = Command::new(&program).args(args).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(Error::Failed {
                program,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(CipherRun { stdout })
    }
}

impl ByteSource for CipherService {
    fn obtain_byte_stream(&self, code: &SessionCode) -> anyhow::Result<Vec<u8>> {
        self.encrypt(code)?;
        let path = self.layout.encrypted(code);
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// What a successful cipher run printed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CipherRun {
    /// Standard output of the cipher program.
    pub stdout: String,
}

/// The error type for [CipherService].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The cipher program exited unsuccessfully.
    #[error("{} failed (status {status:?}): {stderr}", program.display())]
    Failed {
        /// The program that was run.
        program: PathBuf,
        /// Exit status, if the program exited normally.
        status: Option<i32>,
        /// Standard error of the program.
        stderr: String,
    },

    /// IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Cipher implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, serde::Serialize, serde::Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "lowercase")]
pub enum CipherKind {
    /// Ciphertext is a copy of the plaintext.
    #[derivative(Default)]
    Noop,
    /// The executables in the cipher directory.
    External,
}

impl FromStr for CipherKind {
    type Err = UnknownCipher;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noop" => Ok(Self::Noop),
            "external" => Ok(Self::External),
            _ => Err(UnknownCipher(s.to_owned())),
        }
    }
}

/// An unrecognized cipher name.
#[derive(Debug, thiserror::Error)]
#[error("unknown cipher `{0}` (expected `noop` or `external`)")]
pub struct UnknownCipher(String);

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(root: &Path, code: &SessionCode, input: &[u8]) -> anyhow::Result<SessionLayout> {
        let layout = SessionLayout::new(root);
        fs::create_dir_all(layout.dir(code))?;
        fs::write(layout.input(code), input)?;
        Ok(layout)
    }

    #[test]
    fn noop_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let code: SessionCode = "1234".parse()?;
        let layout = setup(dir.path(), &code, b"plaintext")?;
        let cipher = CipherService::builder().layout(layout.clone()).build();
        assert_eq!(cipher.obtain_byte_stream(&code)?, b"plaintext");
        cipher.decrypt(&code)?;
        assert_eq!(fs::read(layout.output(&code))?, b"plaintext");
        Ok(())
    }

    #[test]
    fn noop_without_input_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let code: SessionCode = "1234".parse()?;
        let cipher = CipherService::builder()
            .layout(SessionLayout::new(dir.path()))
            .build();
        assert!(matches!(cipher.encrypt(&code), Err(Error::Io(..))));
        Ok(())
    }

    #[test]
    fn cipher_kinds() {
        assert_eq!("noop".parse::<CipherKind>().ok(), Some(CipherKind::Noop));
        assert_eq!("external".parse::<CipherKind>().ok(), Some(CipherKind::External));
        assert!("rot13".parse::<CipherKind>().is_err());
        assert_eq!(CipherKind::default(), CipherKind::Noop);
    }

    // All executables are written before anything is spawned.
    #[cfg(unix)]
    #[test]
    fn external_cipher() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fn script(path: PathBuf, body: &str) -> anyhow::Result<()> {
            fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
            Ok(())
        }

        let dir = tempfile::tempdir()?;
        let good = dir.path().join("good");
        let bad = dir.path().join("bad");
        fs::create_dir_all(&good)?;
        fs::create_dir_all(&bad)?;
        script(
            good.join("encrypt"),
            "tr 'a-z' 'b-za' < \"$1\" > \"$2/encrypted.bin\"\necho sealed",
        )?;
        script(
            good.join("decrypt"),
            "code=$(basename \"$1\")\ntr 'b-za' 'a-z' < \"$1/encrypted.bin\" > \"$1/${code}_output.png\"",
        )?;
        script(bad.join("encrypt"), "echo boom >&2\nexit 3")?;

        let code: SessionCode = "5678".parse()?;
        let layout = setup(&dir.path().join("data"), &code, b"hello")?;

        let cipher = CipherService::builder()
            .cipher_dir(&good)
            .layout(layout.clone())
            .kind(CipherKind::External)
            .build();
        let run = cipher.encrypt(&code)?;
        assert_eq!(run.stdout, "sealed\n");
        assert_eq!(fs::read(layout.encrypted(&code))?, b"ifmmp");
        cipher.decrypt(&code)?;
        assert_eq!(fs::read(layout.output(&code))?, b"hello");

        let failing = CipherService::builder()
            .cipher_dir(&bad)
            .layout(layout)
            .kind(CipherKind::External)
            .build();
        match failing.encrypt(&code) {
            Err(Error::Failed { status, stderr, .. }) => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(failing.obtain_byte_stream(&code).is_err());
        Ok(())
    }
}

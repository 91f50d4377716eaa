use std::path::PathBuf;

use anyhow::Context;
use cipher_frontend::{CipherKind, CipherService};
use splitflow_core::{Bytes, SessionCode, Traversal};
use splitflow_utils::{SessionLayout, Terminals};

use crate::{Driver, RouteOpts};

/// Route files over the maximum-flow paths of a capacity graph.
#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Directory holding one subdirectory per session
    #[arg(long, global = true, default_value = "./data")]
    root: PathBuf,
    /// Topology file (JSON or Dhall); the built-in reference topology if absent
    #[arg(long, global = true)]
    topology: Option<PathBuf>,
    /// Cipher implementation
    #[arg(long, global = true, default_value = "noop")]
    cipher: CipherKind,
    /// Directory containing the `encrypt` and `decrypt` executables
    #[arg(long, global = true, default_value = "cryptlib")]
    cipher_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Store, encrypt and route a file
    Send {
        /// The file to send
        input: PathBuf,
        /// Session code; a random four-digit code if absent
        #[arg(long)]
        code: Option<SessionCode>,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Route sessions whose inputs are already stored, in parallel
    Batch {
        #[arg(required = true)]
        codes: Vec<SessionCode>,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Decrypt a session and print its routing log
    Receive { code: SessionCode },
}

#[derive(Debug, clap::Args)]
struct RouteArgs {
    /// Maximum packet payload in bytes
    #[arg(long, default_value = "1024")]
    packet_size: Bytes,
    /// Frame derivation (`reference` or `walk`)
    #[arg(long, default_value = "reference")]
    traversal: Traversal,
    /// Write each packet to the session's `packets/` directory
    #[arg(long)]
    save_packets: bool,
}

impl From<RouteArgs> for RouteOpts {
    fn from(args: RouteArgs) -> Self {
        RouteOpts::builder()
            .packet_size(args.packet_size)
            .traversal(args.traversal)
            .save_packets(args.save_packets)
            .build()
    }
}

impl Args {
    pub fn run(self) -> anyhow::Result<()> {
        let terminals = match &self.topology {
            Some(path) => splitflow_utils::read_graph(path)
                .with_context(|| format!("failed to read topology {}", path.display()))?,
            None => Terminals::reference(),
        };
        let cipher = CipherService::builder()
            .cipher_dir(self.cipher_dir)
            .layout(SessionLayout::new(self.root))
            .kind(self.cipher)
            .build();
        let driver = Driver::new(terminals, cipher);

        match self.command {
            Command::Send { input, code, route } => {
                let code = code.unwrap_or_else(|| SessionCode::random(&mut rand::thread_rng()));
                println!("Your code: {code}");
                let out = driver.send(&input, &code, route.into())?;
                print!("{}", out.trace);
            }
            Command::Batch { codes, route } => {
                let results = driver.batch(&codes, route.into());
                let nr_failed = results.iter().filter(|(_, res)| res.is_err()).count();
                for (code, res) in results {
                    match res {
                        Ok(out) => println!(
                            "{code}: {} packets, {} frames",
                            out.packets.len(),
                            out.frames.len()
                        ),
                        Err(e) => println!("{code}: failed ({e})"),
                    }
                }
                anyhow::ensure!(
                    nr_failed == 0,
                    "{nr_failed} of {} sessions failed",
                    codes.len()
                );
            }
            Command::Receive { code } => {
                let received = driver.receive(&code)?;
                println!("Decrypted to {}", received.output.display());
                print!("{}", received.log);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_send() -> anyhow::Result<()> {
        let args = Args::try_parse_from([
            "splitflow",
            "send",
            "cat.png",
            "--code",
            "4821",
            "--packet-size",
            "512",
            "--traversal",
            "walk",
            "--cipher",
            "external",
        ])?;
        assert_eq!(args.root, PathBuf::from("./data"));
        assert_eq!(args.cipher, CipherKind::External);
        assert_eq!(args.cipher_dir, PathBuf::from("cryptlib"));
        match args.command {
            Command::Send { input, code, route } => {
                assert_eq!(input, PathBuf::from("cat.png"));
                assert_eq!(code.as_ref().map(SessionCode::as_str), Some("4821"));
                assert_eq!(route.packet_size, Bytes::new(512));
                assert_eq!(route.traversal, Traversal::Walk);
                assert!(!route.save_packets);
            }
            other => panic!("expected send, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn send_defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["splitflow", "send", "cat.png"])?;
        let Command::Send { code, route, .. } = args.command else {
            panic!("expected send");
        };
        assert!(code.is_none());
        let opts = RouteOpts::from(route);
        assert_eq!(opts.packet_size, Bytes::new(1024));
        assert_eq!(opts.traversal, Traversal::Reference);
        Ok(())
    }

    #[test]
    fn batch_needs_codes() {
        assert!(Args::try_parse_from(["splitflow", "batch"]).is_err());
    }

    #[test]
    fn bad_codes_are_rejected() {
        assert!(Args::try_parse_from(["splitflow", "receive", "../etc"]).is_err());
    }
}

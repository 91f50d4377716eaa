//! A session routes one byte stream, identified by a [`SessionCode`], over a capacity graph.
//! Every intermediate result is owned by the session; nothing is shared between sessions.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use log::{info, warn};
use rand::Rng;

use crate::assign::{self, Assignment, AssignmentPolicy, RoundRobin};
use crate::frames::{self, Frame, Traversal};
use crate::maxflow::{self, FlowDecomposition};
use crate::network::{CapacityGraph, NodeId};
use crate::packet::{self, Packet, DEFAULT_PACKET_SIZE};
use crate::run::Error;
use crate::trace;
use crate::units::Bytes;

/// The external identity of a session. Codes name directories, so they are restricted to
/// ASCII alphanumerics, `-` and `_`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Draws a random four-digit code.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(rng.gen_range(1000..=9999).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CodeError::Empty);
        }
        match s
            .chars()
            .find(|&c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            Some(c) => Err(CodeError::InvalidChar { code: s.into(), c }),
            None => Ok(Self(s.to_owned())),
        }
    }
}

impl TryFrom<String> for SessionCode {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> Self {
        code.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("session code is empty")]
    Empty,

    #[error("session code `{code}` contains invalid character {c:?}")]
    InvalidChar { code: String, c: char },
}

/// Session options.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct SessionOpts {
    /// Where flow enters the network.
    pub source: NodeId,
    /// Where flow leaves the network.
    pub sink: NodeId,
    /// Maximum payload per packet.
    #[builder(default = DEFAULT_PACKET_SIZE)]
    #[serde(default = "default_packet_size")]
    pub packet_size: Bytes,
    /// How frames are derived.
    #[builder(default)]
    #[serde(default)]
    pub traversal: Traversal,
}

fn default_packet_size() -> Bytes {
    DEFAULT_PACKET_SIZE
}

/// The context threaded through every stage of one session.
#[derive(Debug)]
pub struct Session<'a, P = RoundRobin> {
    code: SessionCode,
    graph: &'a CapacityGraph,
    opts: SessionOpts,
    policy: P,
}

impl<'a> Session<'a> {
    pub fn new(code: SessionCode, graph: &'a CapacityGraph, opts: SessionOpts) -> Self {
        Self::with_policy(code, graph, opts, RoundRobin)
    }
}

impl<'a, P: AssignmentPolicy> Session<'a, P> {
    pub fn with_policy(
        code: SessionCode,
        graph: &'a CapacityGraph,
        opts: SessionOpts,
        policy: P,
    ) -> Self {
        Self {
            code,
            graph,
            opts,
            policy,
        }
    }

    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Checks the terminals and the packet size. Reads no input.
    pub fn validate(&self) -> Result<(), Error> {
        let SessionOpts {
            source,
            sink,
            packet_size,
            ..
        } = self.opts;
        maxflow::check_terminals(self.graph, source, sink)?;
        if packet_size == Bytes::ZERO {
            return Err(Error::InvalidPacketSize(packet_size));
        }
        Ok(())
    }

    /// Runs every stage on `stream`: maximum flow, segmentation, assignment, trace and frames.
    ///
    /// If the graph admits no path but the stream is not empty, the packets are returned
    /// inside [`Error::NoRoutablePath`].
    pub fn run(&self, stream: impl Read) -> Result<SessionOutput, Error> {
        let SessionOpts {
            source,
            sink,
            packet_size,
            traversal,
        } = self.opts;
        self.validate()?;
        let flow = maxflow::max_flow(self.graph, source, sink)?;

        let packets = packet::segment(stream, packet_size)?;
        info!(
            "[{}] split stream into {} packets of at most {packet_size}",
            self.code,
            packets.len()
        );

        let assignment = match self.policy.assign(packets.len(), flow.nr_paths()) {
            Ok(assignment) => assignment,
            Err(assign::Error::NoRoutablePath { nr_packets }) => {
                warn!("[{}] no path from {source} to {sink} for {nr_packets} packets", self.code);
                return Err(Error::NoRoutablePath { packets });
            }
        };

        let trace = trace::render(&flow.paths, &assignment);
        let frames = frames::frames(&flow.paths, &assignment, traversal)?;
        info!("[{}] produced {} frames", self.code, frames.len());

        Ok(SessionOutput {
            code: self.code.clone(),
            flow,
            packets,
            assignment,
            trace,
            frames,
        })
    }
}

/// Everything a session produces.
#[derive(Debug, Clone)]
pub struct SessionOutput {
    pub code: SessionCode,
    pub flow: FlowDecomposition,
    pub packets: Vec<Packet>,
    pub assignment: Assignment,
    pub trace: String,
    pub frames: Vec<Frame>,
}

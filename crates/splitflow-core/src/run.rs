//! Running a session end to end, from obtaining its bytes to publishing its outputs.

use log::info;

use crate::assign::AssignmentPolicy;
use crate::boundary::{ByteSource, Publisher};
use crate::packet::{self, Packet};
use crate::session::{Session, SessionCode, SessionOutput};
use crate::units::Bytes;
use crate::{frames, maxflow};

/// Obtains the session's byte stream from `source`, runs every stage, and hands the trace and
/// frames to `publisher`. Nothing is published if any stage fails, and `source` is not asked
/// for bytes unless the session is valid.
pub fn run<P: AssignmentPolicy>(
    session: &Session<'_, P>,
    source: &impl ByteSource,
    publisher: &impl Publisher,
) -> Result<SessionOutput, Error> {
    session.validate()?;
    let code = session.code();
    let stream = source
        .obtain_byte_stream(code)
        .map_err(|source| Error::UpstreamUnavailable {
            code: code.clone(),
            source,
        })?;
    info!("[{code}] obtained {} bytes", stream.len());
    let out = session.run(&stream[..])?;
    publisher
        .publish(code, &out.trace, &out.frames)
        .map_err(|source| Error::Publish {
            code: code.clone(),
            source,
        })?;
    info!("[{code}] published");
    Ok(out)
}

/// The ways a session can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid graph")]
    InvalidGraph(#[from] maxflow::Error),

    #[error("invalid packet size {0} (must be positive)")]
    InvalidPacketSize(Bytes),

    /// The stream was segmented, but the graph has no path to carry it.
    #[error("no routable path for {} packets", packets.len())]
    NoRoutablePath { packets: Vec<Packet> },

    #[error("byte stream for session {code} is unavailable")]
    UpstreamUnavailable {
        code: SessionCode,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read byte stream")]
    Stream(#[source] std::io::Error),

    #[error("failed to sequence frames")]
    Frames(#[from] frames::Error),

    #[error("failed to publish outputs of session {code}")]
    Publish {
        code: SessionCode,
        #[source]
        source: anyhow::Error,
    },
}

impl From<packet::Error> for Error {
    fn from(e: packet::Error) -> Self {
        match e {
            packet::Error::InvalidPacketSize(size) => Self::InvalidPacketSize(size),
            packet::Error::Io(e) => Self::Stream(e),
        }
    }
}

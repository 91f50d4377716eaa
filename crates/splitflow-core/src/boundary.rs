//! The seams between a session and the outside world.

use crate::frames::Frame;
use crate::session::SessionCode;

/// Supplies the byte stream for a session, typically by asking an upstream service to
/// produce it.
pub trait ByteSource {
    fn obtain_byte_stream(&self, code: &SessionCode) -> anyhow::Result<Vec<u8>>;
}

impl<T: ByteSource> ByteSource for &T {
    fn obtain_byte_stream(&self, code: &SessionCode) -> anyhow::Result<Vec<u8>> {
        (*self).obtain_byte_stream(code)
    }
}

/// Receives the outputs of a completed session.
pub trait Publisher {
    fn publish(&self, code: &SessionCode, trace: &str, frames: &[Frame]) -> anyhow::Result<()>;
}

impl<T: Publisher> Publisher for &T {
    fn publish(&self, code: &SessionCode, trace: &str, frames: &[Frame]) -> anyhow::Result<()> {
        (*self).publish(code, trace, frames)
    }
}

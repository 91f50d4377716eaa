//! Splitting a byte stream into fixed-size, sequentially numbered packets.

use std::io::{self, Read};

use crate::units::Bytes;

identifier!(PacketId, usize);

/// The packet size used when none is configured.
pub const DEFAULT_PACKET_SIZE: Bytes = Bytes::new(1024);

/// A chunk of the input stream. Every packet except possibly the last holds exactly
/// `packet_size` bytes.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Packet {
    pub id: PacketId,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn size(&self) -> Bytes {
        Bytes::new(self.payload.len() as u64)
    }
}

/// A lazy iterator of packets read from `R`. Packet IDs are dense and start at zero.
///
/// The segmenter reads strictly forward. After yielding an I/O error it yields nothing else.
#[derive(Debug)]
pub struct Segmenter<R> {
    reader: R,
    packet_size: u64,
    next_id: usize,
    done: bool,
}

impl<R: Read> Segmenter<R> {
    /// Creates a segmenter. Returns an error if `packet_size` is zero.
    pub fn new(reader: R, packet_size: Bytes) -> Result<Self, Error> {
        if packet_size == Bytes::ZERO {
            return Err(Error::InvalidPacketSize(packet_size));
        }
        Ok(Self {
            reader,
            packet_size: packet_size.into_u64(),
            next_id: 0,
            done: false,
        })
    }

    fn read_chunk(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        // `take` keeps reading across short reads until the chunk is full or the stream ends
        self.reader
            .by_ref()
            .take(self.packet_size)
            .read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read> Iterator for Segmenter<R> {
    type Item = io::Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(buf) if buf.is_empty() => {
                self.done = true;
                None
            }
            Ok(buf) => {
                let packet = Packet::new(PacketId::new(self.next_id), buf);
                self.next_id += 1;
                Some(Ok(packet))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Segments a stream in one go.
pub fn segment(reader: impl Read, packet_size: Bytes) -> Result<Vec<Packet>, Error> {
    let packets = Segmenter::new(reader, packet_size)?.collect::<io::Result<Vec<_>>>()?;
    Ok(packets)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid packet size {0} (must be positive)")]
    InvalidPacketSize(Bytes),

    #[error("failed to read byte stream")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `max` bytes per `read` call.
    struct Trickle<'a> {
        data: &'a [u8],
        max: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.max.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "unplugged"))
        }
    }

    #[test]
    fn ten_bytes_by_four() -> anyhow::Result<()> {
        let data = (0..10).collect::<Vec<u8>>();
        let packets = segment(&data[..], Bytes::new(4))?;
        let ids = packets.iter().map(|p| p.id.inner()).collect::<Vec<_>>();
        let lens = packets.iter().map(|p| p.payload.len()).collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(lens, vec![4, 4, 2]);
        Ok(())
    }

    #[test]
    fn empty_stream_has_no_packets() -> anyhow::Result<()> {
        let packets = segment(io::empty(), DEFAULT_PACKET_SIZE)?;
        assert!(packets.is_empty());
        Ok(())
    }

    #[test]
    fn zero_packet_size_fails() {
        let res = segment(&b"abc"[..], Bytes::ZERO);
        assert!(matches!(res, Err(Error::InvalidPacketSize(..))));
    }

    #[test]
    fn concatenation_restores_stream() -> anyhow::Result<()> {
        let data = (0..=255u8).cycle().take(5000).collect::<Vec<_>>();
        for size in [1, 3, 7, 1024, 4999, 5000, 6000] {
            let reader = Trickle {
                data: &data,
                max: 5,
            };
            let packets = segment(reader, Bytes::new(size))?;
            let expected_len = (data.len() as u64 + size - 1) / size;
            assert_eq!(packets.len() as u64, expected_len, "size {size}");
            assert!(packets.iter().enumerate().all(|(i, p)| p.id.inner() == i));
            let joined = packets.into_iter().flat_map(|p| p.payload).collect::<Vec<_>>();
            assert_eq!(joined, data, "size {size}");
        }
        Ok(())
    }

    #[test]
    fn short_reads_still_fill_packets() -> anyhow::Result<()> {
        let data = [7u8; 10];
        let reader = Trickle {
            data: &data,
            max: 3,
        };
        let sizes = segment(reader, Bytes::new(4))?
            .iter()
            .map(|p| p.size().into_u64())
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![4, 4, 2]);
        Ok(())
    }

    #[test]
    fn read_error_ends_iteration() -> anyhow::Result<()> {
        let mut segmenter = Segmenter::new(Broken, Bytes::new(4))?;
        assert!(matches!(segmenter.next(), Some(Err(_))));
        assert!(segmenter.next().is_none());
        Ok(())
    }
}

use std::fs;

use anyhow::Context;
use log::debug;
use splitflow_core::{ByteSource, CapacityGraph, Frame, Packet, Publisher, SessionCode};

use crate::layout::SessionLayout;

/// Session storage on the local filesystem.
///
/// As a [`ByteSource`], the store hands out a session's stored ciphertext. As a [`Publisher`],
/// it writes the trace and the frame sequence next to it.
#[derive(Debug, Clone)]
pub struct FsStore {
    layout: SessionLayout,
}

impl FsStore {
    /// Creates a store over `layout`.
    pub fn new(layout: SessionLayout) -> Self {
        Self { layout }
    }

    /// The store's layout.
    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    /// Writes each packet to `packets/packet_<id>.bin`.
    pub fn save_packets(&self, code: &SessionCode, packets: &[Packet]) -> anyhow::Result<()> {
        let dir = self.layout.packets_dir(code);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        for packet in packets {
            let path = self.layout.packet(code, packet.id);
            fs::write(&path, &packet.payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        debug!("[{code}] saved {} packets", packets.len());
        Ok(())
    }

    /// Writes the topology in Graphviz format.
    pub fn write_dot(&self, code: &SessionCode, graph: &CapacityGraph) -> anyhow::Result<()> {
        let path = self.layout.dot(code);
        fs::create_dir_all(self.layout.dir(code))?;
        fs::write(&path, graph.to_dot())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reads a published trace.
    pub fn read_log(&self, code: &SessionCode) -> anyhow::Result<String> {
        let path = self.layout.log(code);
        fs::read_to_string(&path).with_context(|| format!("no log at {}", path.display()))
    }

    /// Reads a published frame sequence.
    pub fn read_frames(&self, code: &SessionCode) -> anyhow::Result<Vec<Frame>> {
        let path = self.layout.frames(code);
        let contents =
            fs::read_to_string(&path).with_context(|| format!("no frames at {}", path.display()))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ByteSource for FsStore {
    fn obtain_byte_stream(&self, code: &SessionCode) -> anyhow::Result<Vec<u8>> {
        let path = self.layout.encrypted(code);
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

impl Publisher for FsStore {
    fn publish(&self, code: &SessionCode, trace: &str, frames: &[Frame]) -> anyhow::Result<()> {
        let dir = self.layout.dir(code);
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let log = self.layout.log(code);
        fs::write(&log, trace).with_context(|| format!("failed to write {}", log.display()))?;
        let path = self.layout.frames(code);
        let frames = serde_json::to_string_pretty(frames)?;
        fs::write(&path, frames).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("[{code}] published to {}", dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use splitflow_core::{NodeId, PacketId, PathId};

    use super::*;

    fn store(dir: &tempfile::TempDir) -> FsStore {
        FsStore::new(SessionLayout::new(dir.path()))
    }

    #[test]
    fn publish_then_read_back() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = store(&dir);
        let code: SessionCode = "1111".parse()?;
        let frames = vec![Frame {
            frame_index: 0,
            packet_id: PacketId::new(0),
            path_id: PathId::new(0),
            current_node: NodeId::new(0),
        }];
        store.publish(&code, "Path 0: 0 -> 1\nPacket ID 0 uses Path 0\n", &frames)?;
        assert_eq!(
            store.read_log(&code)?,
            "Path 0: 0 -> 1\nPacket ID 0 uses Path 0\n"
        );
        assert_eq!(store.read_frames(&code)?, frames);
        Ok(())
    }

    #[test]
    fn reads_stored_ciphertext() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = store(&dir);
        let code: SessionCode = "2222".parse()?;
        fs::create_dir_all(store.layout().dir(&code))?;
        fs::write(store.layout().encrypted(&code), [9u8; 5])?;
        assert_eq!(store.obtain_byte_stream(&code)?, vec![9u8; 5]);
        Ok(())
    }

    #[test]
    fn missing_ciphertext_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let code: SessionCode = "3333".parse()?;
        assert!(store(&dir).obtain_byte_stream(&code).is_err());
        Ok(())
    }

    #[test]
    fn packets_and_dot_are_saved() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = store(&dir);
        let code: SessionCode = "4444".parse()?;
        let packets = vec![
            Packet::new(PacketId::new(0), vec![1, 2]),
            Packet::new(PacketId::new(1), vec![3]),
        ];
        store.save_packets(&code, &packets)?;
        assert_eq!(fs::read(store.layout().packet(&code, PacketId::new(1)))?, vec![3]);
        store.write_dot(&code, &CapacityGraph::reference())?;
        let dot = fs::read_to_string(store.layout().dot(&code))?;
        assert!(dot.starts_with("digraph"));
        Ok(())
    }
}

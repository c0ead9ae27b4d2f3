//! Binary tree deserialization (read side).
//!
//! Decodes the gzip-wrapped preorder stream written by
//! `tzfinder-index::writer` (see that module for the layout). The format
//! is self-delimiting with an overloaded discriminator (the `i16` after
//! a payload is either the `-1` leaf sentinel or already the first
//! payload short of the `hi` child), so reads are strictly sequential and
//! every error carries the byte offset (of the uncompressed stream) where
//! decoding failed.

use std::io::Read;

use flate2::read::GzDecoder;

use tzfinder_core::{Node, TimeZoneIndex, Tree};

use crate::error::{LookupError, Result};

const LEAF_SENTINEL: i16 = -1;

/// Deserialize a tree from a gzip stream.
pub fn read_tree<R: Read>(reader: R) -> Result<Tree> {
    let mut reader = TreeReader::new(GzDecoder::new(reader));

    let id_count = reader.read_u16()?;
    if id_count == 0 || id_count > i16::MAX as u16 {
        return Err(reader.malformed(format!("id count {id_count} outside 1..=32767")));
    }

    let mut ids = Vec::with_capacity(id_count as usize);
    for _ in 0..id_count {
        ids.push(reader.read_string()?);
    }

    let first = reader.read_i16()?;
    let root = reader.read_node(first, id_count)?;

    let tree = Tree::new(root, ids);
    tracing::debug!(zones = id_count, nodes = tree.node_count, "tree loaded");
    Ok(tree)
}

/// Sequential decoder tracking its offset into the uncompressed stream.
struct TreeReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> TreeReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    fn malformed(&self, message: impl Into<String>) -> LookupError {
        LookupError::Malformed {
            offset: self.offset,
            message: message.into(),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                self.malformed("unexpected end of stream")
            } else {
                LookupError::NotReadable(e)
            }
        })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// 7-bit little-endian varint length, then that many UTF-8 bytes.
    fn read_string(&mut self) -> Result<String> {
        let mut len: u32 = 0;
        let mut shift = 0u32;
        loop {
            let mut byte = [0u8; 1];
            self.read_exact(&mut byte)?;
            if shift >= 28 && byte[0] > 0x0F {
                return Err(self.malformed("string length varint overflows u32"));
            }
            len |= ((byte[0] & 0x7F) as u32) << shift;
            if byte[0] & 0x80 == 0 {
                break;
            }
            shift += 7;
        }

        let mut bytes = vec![0u8; len as usize];
        self.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| self.malformed(format!("id is not UTF-8: {e}")))
    }

    /// Decode one node whose first payload short has already been read.
    fn read_node(&mut self, first: i16, id_count: u16) -> Result<Node> {
        let index = if first >= 0 {
            TimeZoneIndex::from_parts(first as u16, 0)
        } else if first == LEAF_SENTINEL {
            return Err(self.malformed("leaf sentinel in node position"));
        } else {
            let complemented = !first as u16;
            let second = self.read_i16()?;
            if second <= 0 {
                return Err(self.malformed(format!("second index {second} must be positive")));
            }
            TimeZoneIndex::from_parts(complemented, second as u16)
        };

        for part in [index.first(), index.second()] {
            if part > id_count {
                return Err(self.malformed(format!(
                    "index {part} past id table of {id_count}"
                )));
            }
        }

        let discriminator = self.read_i16()?;
        if discriminator == LEAF_SENTINEL {
            return Ok(Node {
                index,
                children: None,
            });
        }

        let hi = self.read_node(discriminator, id_count)?;
        let lo_first = self.read_i16()?;
        let lo = self.read_node(lo_first, id_count)?;
        Ok(Node {
            index,
            children: Some(Box::new((hi, lo))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Hand-assemble a gzip stream from raw little-endian pieces.
    fn gz(raw: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        encoder.finish().unwrap()
    }

    fn stream(shorts: &[i16], ids: &[&str]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(ids.len() as u16).to_le_bytes());
        for id in ids {
            raw.push(id.len() as u8);
            raw.extend_from_slice(id.as_bytes());
        }
        for s in shorts {
            raw.extend_from_slice(&s.to_le_bytes());
        }
        gz(raw.as_slice())
    }

    #[test]
    fn test_read_single_leaf() {
        let data = stream(&[1, -1], &["Europe/Paris"]);
        let tree = read_tree(data.as_slice()).unwrap();
        assert_eq!(tree.node_count, 1);
        assert_eq!(tree.root.index.first(), 1);
        assert!(tree.root.is_leaf());
        assert_eq!(tree.ids, vec!["Europe/Paris"]);
    }

    #[test]
    fn test_read_internal_with_two_index_leaf() {
        // Root (payload 0) with hi = leaf 1 and lo = two-index leaf (1, 2).
        let data = stream(&[0, 1, -1, -2, 2, -1], &["A/B", "C/D"]);
        let tree = read_tree(data.as_slice()).unwrap();
        assert_eq!(tree.node_count, 3);
        let pair = tree.root.children.as_ref().unwrap();
        assert_eq!(pair.0.index.first(), 1);
        assert_eq!((pair.1.index.first(), pair.1.index.second()), (1, 2));
    }

    #[test]
    fn test_sentinel_in_node_position_is_malformed() {
        let data = stream(&[-1, -1], &["A/B"]);
        match read_tree(data.as_slice()) {
            Err(LookupError::Malformed { offset, .. }) => {
                // After the id table (2 + 1 + 3 bytes) and the short itself.
                assert_eq!(offset, 8);
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_index_past_table_is_malformed() {
        let data = stream(&[5, -1], &["A/B"]);
        assert!(matches!(
            read_tree(data.as_slice()),
            Err(LookupError::Malformed { .. })
        ));
    }

    #[test]
    fn test_truncated_stream_is_malformed() {
        // Internal node whose lo subtree is missing.
        let data = stream(&[0, 1, -1], &["A/B"]);
        assert!(matches!(
            read_tree(data.as_slice()),
            Err(LookupError::Malformed { .. })
        ));
    }

    #[test]
    fn test_zero_id_count_is_malformed() {
        let data = stream(&[], &[]);
        assert!(matches!(
            read_tree(data.as_slice()),
            Err(LookupError::Malformed { .. })
        ));
    }

    #[test]
    fn test_negative_second_is_malformed() {
        let data = stream(&[-2, -3, -1], &["A/B", "C/D"]);
        assert!(matches!(
            read_tree(data.as_slice()),
            Err(LookupError::Malformed { .. })
        ));
    }
}

//! Binary tree serialization (write side).
//!
//! The matching reader lives in `tzfinder-lookup`; the two must agree on
//! this stream layout, little-endian throughout, wrapped in gzip:
//!
//! ```text
//! u16   N                      id count, 1 ≤ N ≤ 32,767
//! N ×   varint len + UTF-8     id table (7-bit little-endian varint)
//! node                         preorder, self-delimiting:
//!
//! node := payload children
//! payload  := i16 first                     single or empty (first ≥ 0)
//!           | i16 ~first, i16 second        two-index leaf (~first < -1)
//! children := i16 -1                        leaf sentinel
//!           | node node                     hi subtree then lo subtree
//! ```
//!
//! The children discriminator is overloaded: a `-1` closes a leaf, any
//! other value is already the first payload short of the `hi` child. That
//! makes the stream dense and strictly sequential; there is no way to
//! skip a subtree without decoding it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use tzfinder_core::{Node, Tree};

use crate::error::{BuildError, Result};
use crate::progress::{Progress, ProgressStep};

/// Leaf sentinel in the children position.
const LEAF_SENTINEL: i16 = -1;

/// Serialize `tree` as a gzip stream into `writer`.
pub fn write_tree<W: Write>(tree: &Tree, writer: W) -> Result<()> {
    if tree.ids.is_empty() || tree.ids.len() > i16::MAX as usize {
        return Err(BuildError::InvalidInput(format!(
            "id table must hold 1..=32767 entries, has {}",
            tree.ids.len()
        )));
    }

    let mut out = BufWriter::new(GzEncoder::new(writer, Compression::default()));

    out.write_all(&(tree.ids.len() as u16).to_le_bytes())?;
    for id in &tree.ids {
        write_varint(&mut out, id.len() as u32)?;
        out.write_all(id.as_bytes())?;
    }

    write_node(&mut out, &tree.root)?;

    out.into_inner()
       .map_err(|e| e.into_error())?
       .finish()?;
    Ok(())
}

/// Serialize `tree` to `path` via a sibling temp file and an atomic
/// rename, so a crash never leaves a half-written data file in place.
pub fn write_tree_to_path(tree: &Tree, path: &Path, progress: &dyn Progress) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    let file = File::create(&tmp_path)?;
    write_tree(tree, file)?;
    std::fs::rename(&tmp_path, path)?;

    progress.on_progress(ProgressStep::Write, 1);
    tracing::info!(
        path = %path.display(),
        nodes = tree.node_count,
        zones = tree.ids.len(),
        "tree written"
    );
    Ok(())
}

/// 7-bit little-endian varint, the classic length-prefix encoding: low
/// seven bits per byte, high bit set while more bytes follow.
fn write_varint<W: Write>(out: &mut W, mut value: u32) -> Result<()> {
    while value >= 0x80 {
        out.write_all(&[(value as u8 & 0x7F) | 0x80])?;
        value >>= 7;
    }
    out.write_all(&[value as u8])?;
    Ok(())
}

fn write_node<W: Write>(out: &mut W, node: &Node) -> Result<()> {
    let first = node.index.first();
    let second = node.index.second();
    debug_assert!(
        second == 0 || first < second,
        "two-index payloads must be canonical before serialization"
    );

    if second != 0 {
        out.write_all(&(!(first as i16)).to_le_bytes())?;
        out.write_all(&(second as i16).to_le_bytes())?;
    } else {
        out.write_all(&(first as i16).to_le_bytes())?;
    }

    match &node.children {
        None => out.write_all(&LEAF_SENTINEL.to_le_bytes())?,
        Some(pair) => {
            write_node(out, &pair.0)?;
            write_node(out, &pair.1)?;
        }
    }
    Ok(())
}

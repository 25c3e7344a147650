//! Media loading behind a trait, plus per-node draw tokens.
//!
//! Every load request bumps its node's token; a completion carrying an older token
//! is stale (the user picked another file meanwhile) and must be discarded.

use crate::foundation::error::{LayerflowError, LayerflowResult};
use crate::foundation::ids::NodeId;
use anyhow::Context;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Which loader entry point a job uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image; dimensions are probed.
    Image,
    /// Video; only existence and size are checked.
    Video,
}

/// A loaded media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMedia {
    /// Path the bytes came from.
    pub path: PathBuf,
    /// `file://` URL of the absolute path.
    pub url: String,
    /// Intrinsic width, when known.
    pub width: Option<u32>,
    /// Intrinsic height, when known.
    pub height: Option<u32>,
    /// Size in bytes.
    pub byte_len: u64,
}

/// Source of media bytes and metadata.
pub trait MediaLoader {
    /// Load an image and probe its dimensions.
    fn load_image(&self, path: &Path) -> LayerflowResult<LoadedMedia>;
    /// Load a video.
    fn load_video(&self, path: &Path) -> LayerflowResult<LoadedMedia>;

    /// Dispatch on `kind`.
    fn load(&self, kind: MediaKind, path: &Path) -> LayerflowResult<LoadedMedia> {
        match kind {
            MediaKind::Image => self.load_image(path),
            MediaKind::Video => self.load_video(path),
        }
    }
}

/// Loader reading from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaLoader;

fn file_url(path: &Path) -> LayerflowResult<String> {
    let abs = std::path::absolute(path)
        .with_context(|| format!("resolve absolute path of '{}'", path.display()))?;
    Ok(format!("file://{}", abs.display()))
}

impl MediaLoader for FsMediaLoader {
    fn load_image(&self, path: &Path) -> LayerflowResult<LoadedMedia> {
        let bytes = std::fs::read(path)
            .map_err(|e| LayerflowError::media(format!("read '{}': {e}", path.display())))?;
        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .context("guess image format")?
            .into_dimensions()
            .map_err(|e| {
                LayerflowError::media(format!("probe image '{}': {e}", path.display()))
            })?;
        Ok(LoadedMedia {
            path: path.to_path_buf(),
            url: file_url(path)?,
            width: Some(width),
            height: Some(height),
            byte_len: bytes.len() as u64,
        })
    }

    fn load_video(&self, path: &Path) -> LayerflowResult<LoadedMedia> {
        let meta = std::fs::metadata(path)
            .map_err(|e| LayerflowError::media(format!("stat '{}': {e}", path.display())))?;
        if !meta.is_file() {
            return Err(LayerflowError::media(format!(
                "'{}' is not a file",
                path.display()
            )));
        }
        Ok(LoadedMedia {
            path: path.to_path_buf(),
            url: file_url(path)?,
            width: None,
            height: None,
            byte_len: meta.len(),
        })
    }
}

/// Ticket identifying one load request for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawToken {
    /// Node the media is for.
    pub node: NodeId,
    /// Monotonic per-node sequence number.
    pub seq: u64,
}

/// Latest issued token per node.
#[derive(Debug, Default)]
pub struct DrawTokens {
    latest: HashMap<NodeId, u64>,
}

impl DrawTokens {
    /// Issue a new token for `node`, invalidating earlier ones.
    pub fn issue(&mut self, node: &NodeId) -> DrawToken {
        let seq = self.latest.entry(node.clone()).or_insert(0);
        *seq += 1;
        DrawToken {
            node: node.clone(),
            seq: *seq,
        }
    }

    /// Whether `token` is the newest issued for its node.
    pub fn is_current(&self, token: &DrawToken) -> bool {
        self.latest.get(&token.node) == Some(&token.seq)
    }

    /// Forget a node (removed from the graph).
    pub fn forget(&mut self, node: &str) {
        self.latest.remove(node);
    }
}

/// A queued load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaJob {
    /// Request ticket.
    pub token: DrawToken,
    /// Loader entry point.
    pub kind: MediaKind,
    /// File to load.
    pub path: PathBuf,
}

#[cfg(test)]
#[path = "../../tests/unit/media/loader.rs"]
mod tests;

//! Shared `<resources>` table: formats, assets and media definitions

use ahash::RandomState;
use std::collections::HashMap;

use super::NodeId;
use crate::timecode::FrameRate;
use crate::utils::hashers::create_hash_map;

/// A `<format>` resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub name: Option<String>,
    /// Derived from `frameDuration`; `None` for still-image formats
    pub frame_rate: Option<FrameRate>,
}

/// An `<asset>` resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    pub name: Option<String>,
    /// Media URL from the `src` attribute or the first `<media-rep>`
    pub src: Option<String>,
    /// Format id
    pub format: Option<String>,
    pub has_video: bool,
    pub has_audio: bool,
}

impl Asset {
    /// File extension of the media URL including the dot, e.g. `".mov"`
    ///
    /// # Example
    ///
    /// ```rust
    /// use markers_core::model::Asset;
    ///
    /// let asset = Asset {
    ///     src: Some("file:///Volumes/Media/A001_C002.mov".to_string()),
    ///     ..Asset::default()
    /// };
    /// assert_eq!(asset.extension(), Some(".mov"));
    /// ```
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let src = self.src.as_deref()?;
        let path = src.split(['?', '#']).next().unwrap_or(src);
        let file = path.rsplit('/').next().unwrap_or(path);
        let dot = file.rfind('.')?;
        let ext = &file[dot..];
        (dot > 0 && ext.len() > 1).then_some(ext)
    }
}

/// Resource lookup tables keyed by FCPXML `id`
#[derive(Debug, Clone)]
pub struct Resources {
    formats: HashMap<String, Format, RandomState>,
    assets: HashMap<String, Asset, RandomState>,
    media: HashMap<String, NodeId, RandomState>,
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

impl Resources {
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: create_hash_map(),
            assets: create_hash_map(),
            media: create_hash_map(),
        }
    }

    pub fn insert_format(&mut self, id: impl Into<String>, format: Format) {
        self.formats.insert(id.into(), format);
    }

    pub fn insert_asset(&mut self, id: impl Into<String>, asset: Asset) {
        self.assets.insert(id.into(), asset);
    }

    /// Register the arena node decoded from a `<media>` definition
    pub fn insert_media(&mut self, id: impl Into<String>, node: NodeId) {
        self.media.insert(id.into(), node);
    }

    #[must_use]
    pub fn format(&self, id: &str) -> Option<&Format> {
        self.formats.get(id)
    }

    #[must_use]
    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    #[must_use]
    pub fn media(&self, id: &str) -> Option<NodeId> {
        self.media.get(id).copied()
    }

    /// Frame rate of a format id, if the format exists and declares one
    #[must_use]
    pub fn format_rate(&self, id: &str) -> Option<FrameRate> {
        self.format(id).and_then(|format| format.frame_rate)
    }
}

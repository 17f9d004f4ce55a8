use std::borrow::Cow;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use lofty::error::LoftyError;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use thiserror::Error;
use tracing::debug;

/// Error type for tag reading.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The file itself could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The bytes don't look like any audio container lofty knows.
    #[error("unrecognised audio container: {0}")]
    Probe(#[source] io::Error),
    /// The container was recognised but its tags are broken.
    #[error("failed to parse tags: {0}")]
    Parse(#[from] LoftyError),
    /// The file carries no tag at all.
    #[error("no tag present")]
    NoTag,
}

/// Embedded cover art.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub data: Vec<u8>,
    /// MIME type such as `image/jpeg`, when the tag records one.
    pub mime: Option<String>,
}

impl Cover {
    fn from_picture(picture: &Picture) -> Self {
        Self {
            data: picture.data().to_vec(),
            mime: picture.mime_type().map(|m| m.as_str().to_string()),
        }
    }

    /// Short human description, e.g. `image/png, 12 KiB`.
    pub fn describe(&self) -> String {
        let mime = self.mime.as_deref().unwrap_or("image");
        let len = self.data.len();
        if len >= 1024 {
            format!("{mime}, {} KiB", len / 1024)
        } else {
            format!("{mime}, {len} B")
        }
    }
}

/// The few tag fields the player shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<Cover>,
}

fn clean(value: Cow<'_, str>) -> Option<String> {
    let v = value.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if v.is_empty() { None } else { Some(v.to_string()) }
}

/// Parse title, artist and cover from the raw bytes of an audio file.
pub fn parse_tags(bytes: &[u8]) -> Result<TrackTags, MetadataError> {
    let tagged = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .map_err(MetadataError::Probe)?
        .read()?;

    let tag = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .ok_or(MetadataError::NoTag)?;

    let cover = tag
        .get_picture_type(PictureType::CoverFront)
        .or_else(|| tag.pictures().first())
        .map(Cover::from_picture);

    Ok(TrackTags {
        title: tag.title().and_then(clean),
        artist: tag.artist().and_then(clean),
        cover,
    })
}

/// What the now-playing box shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub label: String,
    pub cover: Option<Cover>,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self::empty()
    }
}

impl NowPlaying {
    pub const EMPTY_LABEL: &'static str = "No song playing";
    pub const UNKNOWN_ARTIST: &'static str = "Unknown Artist";

    pub fn empty() -> Self {
        Self {
            label: Self::EMPTY_LABEL.to_string(),
            cover: None,
        }
    }

    /// Fallback when the file or its tags can't be read.
    pub fn filename_only(path: &Path) -> Self {
        Self {
            label: base_name(path),
            cover: None,
        }
    }

    pub fn from_tags(path: &Path, tags: TrackTags) -> Self {
        let title = tags.title.unwrap_or_else(|| base_name(path));
        let artist = tags
            .artist
            .unwrap_or_else(|| Self::UNKNOWN_ARTIST.to_string());
        Self {
            label: format!("{artist} - {title}"),
            cover: tags.cover,
        }
    }
}

/// File name with extension, or the whole path when there is none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_tags_from(path: &Path) -> Result<TrackTags, MetadataError> {
    let bytes = fs::read(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tags(&bytes)
}

/// Read the now-playing view for `path`. Never fails; degrades to the file name.
pub fn read_now_playing(path: &Path) -> NowPlaying {
    match read_tags_from(path) {
        Ok(tags) => NowPlaying::from_tags(path, tags),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "falling back to file name");
            NowPlaying::filename_only(path)
        }
    }
}

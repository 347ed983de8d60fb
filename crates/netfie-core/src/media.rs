//! Media intake: MIME validation and object-URL ownership for uploads.

use crate::shapes::ImageDecodeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Broad media category accepted by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Image, MediaKind::Audio, MediaKind::Video];

    /// Required MIME prefix, e.g. `image/`.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Audio => "audio/",
            MediaKind::Video => "video/",
        }
    }

    /// MIME types are matched case-insensitively after trimming.
    pub fn accepts(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        let prefix = self.mime_prefix();
        mime.len() > prefix.len() && mime.starts_with(prefix)
    }

    /// Detect the kind from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.accepts(mime))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unknown media kind '{other}'")),
        }
    }
}

/// A user-supplied file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Media intake errors.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Please select a valid {expected} file (got '{mime}')")]
    UnsupportedType { expected: MediaKind, mime: String },
    #[error("File '{0}' is empty")]
    Empty(String),
    #[error(transparent)]
    Decode(#[from] ImageDecodeError),
}

/// Check `file` against `kind`. Nothing is mutated on failure.
pub fn validate(kind: MediaKind, file: &MediaFile) -> Result<(), MediaError> {
    if !kind.accepts(&file.mime) {
        log::warn!("Rejected '{}': {} is not {kind}", file.name, file.mime);
        return Err(MediaError::UnsupportedType {
            expected: kind,
            mime: file.mime.clone(),
        });
    }
    if file.bytes.is_empty() {
        log::warn!("Rejected '{}': empty file", file.name);
        return Err(MediaError::Empty(file.name.clone()));
    }
    Ok(())
}

/// A temporary handle that lets a player or viewer load an in-memory file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and revokes object URLs.
pub trait ObjectUrlStore {
    fn create(&mut self, file: &MediaFile) -> ObjectUrl;

    /// Returns false if the URL was not live.
    fn revoke(&mut self, url: &ObjectUrl) -> bool;
}

impl<T: ObjectUrlStore + ?Sized> ObjectUrlStore for &mut T {
    fn create(&mut self, file: &MediaFile) -> ObjectUrl {
        (**self).create(file)
    }

    fn revoke(&mut self, url: &ObjectUrl) -> bool {
        (**self).revoke(url)
    }
}

/// In-process store keeping the bytes behind each live URL.
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    live: HashMap<ObjectUrl, MediaFile>,
    created: usize,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// URLs issued over the life of the store.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn is_live(&self, url: &ObjectUrl) -> bool {
        self.live.contains_key(url)
    }

    pub fn resolve(&self, url: &ObjectUrl) -> Option<&MediaFile> {
        self.live.get(url)
    }
}

impl ObjectUrlStore for MemoryUrlStore {
    fn create(&mut self, file: &MediaFile) -> ObjectUrl {
        let url = ObjectUrl(format!("blob:netfie/{}", Uuid::new_v4()));
        self.live.insert(url.clone(), file.clone());
        self.created += 1;
        url
    }

    fn revoke(&mut self, url: &ObjectUrl) -> bool {
        self.live.remove(url).is_some()
    }
}

/// Holds at most one object URL for a tool and revokes it when replaced,
/// released or dropped.
pub struct MediaSlot<U: ObjectUrlStore> {
    kind: MediaKind,
    store: U,
    current: Option<ObjectUrl>,
}

impl<U: ObjectUrlStore> MediaSlot<U> {
    pub fn new(kind: MediaKind, store: U) -> Self {
        Self {
            kind,
            store,
            current: None,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn url(&self) -> Option<&ObjectUrl> {
        self.current.as_ref()
    }

    /// Validate `file`, issue its URL, then revoke the previous one.
    ///
    /// A rejected file leaves the slot unchanged and issues no URL.
    pub fn replace(&mut self, file: &MediaFile) -> Result<&ObjectUrl, MediaError> {
        validate(self.kind, file)?;
        let previous = self.current.take();
        let url = self.store.create(file);
        log::debug!("Loaded {} '{}' as {url}", self.kind, file.name);
        if let Some(old) = previous {
            self.store.revoke(&old);
        }
        Ok(self.current.insert(url))
    }

    /// Revoke the held URL, if any.
    pub fn release(&mut self) {
        if let Some(url) = self.current.take() {
            self.store.revoke(&url);
            log::debug!("Revoked {url}");
        }
    }
}

impl<U: ObjectUrlStore> Drop for MediaSlot<U> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<U: ObjectUrlStore> fmt::Debug for MediaSlot<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaSlot")
            .field("kind", &self.kind)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(mime: &str) -> MediaFile {
        MediaFile::new("clip", mime, vec![1, 2, 3])
    }

    #[test]
    fn test_prefix_matching() {
        assert!(MediaKind::Image.accepts("image/png"));
        assert!(MediaKind::Audio.accepts("Audio/MPEG"));
        assert!(MediaKind::Video.accepts(" video/mp4 "));
        assert!(!MediaKind::Image.accepts("image/"));
        assert!(!MediaKind::Image.accepts("video/mp4"));
        assert_eq!(MediaKind::from_mime("audio/wav"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_mime("text/plain"), None);
    }

    #[test]
    fn test_validate() {
        assert!(validate(MediaKind::Video, &file("video/webm")).is_ok());
        assert!(matches!(
            validate(MediaKind::Video, &file("audio/ogg")),
            Err(MediaError::UnsupportedType { expected: MediaKind::Video, .. })
        ));
        let empty = MediaFile::new("blank.png", "image/png", Vec::new());
        assert!(matches!(validate(MediaKind::Image, &empty), Err(MediaError::Empty(_))));
    }

    #[test]
    fn test_replace_revokes_previous_after_creating_new() {
        let mut store = MemoryUrlStore::new();
        {
            let mut slot = MediaSlot::new(MediaKind::Audio, &mut store);
            let first = slot.replace(&file("audio/wav")).unwrap().clone();
            let second = slot.replace(&file("audio/mpeg")).unwrap().clone();
            assert_ne!(first, second);
            assert_eq!(slot.url(), Some(&second));
        }
        assert_eq!(store.created_count(), 2);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_rejected_file_keeps_current_url() {
        let mut store = MemoryUrlStore::new();
        let mut slot = MediaSlot::new(MediaKind::Video, &mut store);
        let url = slot.replace(&file("video/mp4")).unwrap().clone();
        assert!(slot.replace(&file("text/plain")).is_err());
        assert_eq!(slot.url(), Some(&url));
        slot.release();
        assert_eq!(slot.url(), None);
        drop(slot);
        assert_eq!(store.created_count(), 1);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_store_resolves_live_urls() {
        let mut store = MemoryUrlStore::new();
        let url = store.create(&file("image/png"));
        assert_eq!(store.resolve(&url).map(|f| f.mime.as_str()), Some("image/png"));
        assert!(store.revoke(&url));
        assert!(!store.revoke(&url));
        assert!(!store.is_live(&url));
    }
}

//! Attachment manifest reported by the portal for a case.

/// Filenames associated with a case, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentManifest {
    filenames: Vec<String>,
}

impl AttachmentManifest {
    /// Creates a manifest from filenames in portal order.
    #[must_use]
    pub fn new(filenames: Vec<String>) -> Self {
        Self { filenames }
    }

    /// Parses the portal's semicolon-joined filename list.
    /// Blank segments are dropped; order is preserved.
    #[must_use]
    pub fn from_joined(joined: &str) -> Self {
        let filenames = joined
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        Self { filenames }
    }

    /// Filenames in portal order.
    #[must_use]
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    /// Filenames from most recent to oldest.
    pub fn most_recent_first(&self) -> impl Iterator<Item = &str> {
        self.filenames.iter().rev().map(String::as_str)
    }

    /// Returns the most recent filename.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.filenames.last().map(String::as_str)
    }

    /// Number of filenames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    /// Returns true when the portal reported nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

/// Attachment chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAttachment {
    /// Filename as listed in the manifest.
    pub filename: String,
}

impl SelectedAttachment {
    /// Creates a selection.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

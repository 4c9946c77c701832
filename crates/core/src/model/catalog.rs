use crate::model::VideoId;

/// Document formats the viewer surface can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentKind {
    Pdf,
}

impl DocumentKind {
    /// Infer the kind from a file name, by extension.
    ///
    /// Returns `None` for anything the viewer cannot embed.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = file_name.rsplit('.').next()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
        }
    }
}

/// A bundled document available in the library view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub path: String,
    pub kind: DocumentKind,
}

impl DocumentInfo {
    /// Build an entry when the file extension is supported.
    #[must_use]
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        let kind = DocumentKind::from_file_name(&path)?;
        Some(Self {
            title: title.into(),
            path,
            kind,
        })
    }
}

/// A training video in the catalog shown under the slide deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingVideo {
    pub id: VideoId,
    pub source: String,
    pub title: String,
}

impl TrainingVideo {
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: VideoId::new(id),
            source: source.into(),
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_file_name("deck.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("deck.pdf"), Some(DocumentKind::Pdf));
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        assert_eq!(DocumentKind::from_file_name("deck.pptx"), None);
        assert_eq!(DocumentKind::from_file_name("noext"), None);
        assert!(DocumentInfo::new("Deck", "slides.key").is_none());
    }

    #[test]
    fn document_info_carries_kind() {
        let doc = DocumentInfo::new("Handbook", "handbook.pdf").unwrap();
        assert_eq!(doc.kind, DocumentKind::Pdf);
        assert_eq!(doc.kind.label(), "PDF");
    }
}

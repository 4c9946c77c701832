use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SlideProgressError {
    #[error("slide {slide} is out of range 1..={total}")]
    SlideOutOfRange { slide: u32, total: u32 },

    #[error("viewed slide list contains duplicates")]
    DuplicateViewed,
}

/// Progress through the slide deck.
///
/// The viewed set is an ordered, duplicate-free list of slide indices
/// (1-based) and the completion percentage is always derived from it,
/// never stored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideProgress {
    total_slides: u32,
    viewed_slides: Vec<u32>,
    current_slide_index: u32,
    last_updated: DateTime<Utc>,
}

impl SlideProgress {
    /// Fresh progress: nothing viewed, positioned on the first slide.
    #[must_use]
    pub fn reset(total_slides: u32, now: DateTime<Utc>) -> Self {
        Self {
            total_slides,
            viewed_slides: Vec::new(),
            current_slide_index: 1,
            last_updated: now,
        }
    }

    /// Rehydrate progress from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SlideProgressError::SlideOutOfRange` if any viewed slide or
    /// the current index falls outside `1..=total_slides`, and
    /// `SlideProgressError::DuplicateViewed` if the viewed list repeats an
    /// index.
    pub fn from_persisted(
        total_slides: u32,
        viewed_slides: Vec<u32>,
        current_slide_index: u32,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, SlideProgressError> {
        for &slide in &viewed_slides {
            if slide < 1 || slide > total_slides {
                return Err(SlideProgressError::SlideOutOfRange {
                    slide,
                    total: total_slides,
                });
            }
        }
        let mut seen = viewed_slides.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != viewed_slides.len() {
            return Err(SlideProgressError::DuplicateViewed);
        }
        if current_slide_index < 1 || current_slide_index > total_slides.max(1) {
            return Err(SlideProgressError::SlideOutOfRange {
                slide: current_slide_index,
                total: total_slides,
            });
        }

        Ok(Self {
            total_slides,
            viewed_slides,
            current_slide_index,
            last_updated,
        })
    }

    #[must_use]
    pub fn total_slides(&self) -> u32 {
        self.total_slides
    }

    #[must_use]
    pub fn viewed_slides(&self) -> &[u32] {
        &self.viewed_slides
    }

    #[must_use]
    pub fn current_slide_index(&self) -> u32 {
        self.current_slide_index
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    #[must_use]
    pub fn has_viewed(&self, slide: u32) -> bool {
        self.viewed_slides.contains(&slide)
    }

    /// Completion percentage derived from the viewed set.
    ///
    /// Defined as 0.0 for an empty deck.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total_slides == 0 {
            return 0.0;
        }
        (self.viewed_slides.len() as f64 / f64::from(self.total_slides)) * 100.0
    }

    /// Record that a slide has been viewed. Idempotent.
    ///
    /// Returns `true` when the slide was newly added to the viewed set.
    ///
    /// # Errors
    ///
    /// Returns `SlideProgressError::SlideOutOfRange` for indices outside the
    /// deck.
    pub fn record_view(&mut self, slide: u32, now: DateTime<Utc>) -> Result<bool, SlideProgressError> {
        if slide < 1 || slide > self.total_slides {
            return Err(SlideProgressError::SlideOutOfRange {
                slide,
                total: self.total_slides,
            });
        }
        self.last_updated = now;
        if self.has_viewed(slide) {
            return Ok(false);
        }
        self.viewed_slides.push(slide);
        Ok(true)
    }

    /// Move the resumption point to the given slide.
    ///
    /// # Errors
    ///
    /// Returns `SlideProgressError::SlideOutOfRange` for indices outside the
    /// deck.
    pub fn set_current(&mut self, slide: u32) -> Result<(), SlideProgressError> {
        if slide < 1 || slide > self.total_slides.max(1) {
            return Err(SlideProgressError::SlideOutOfRange {
                slide,
                total: self.total_slides,
            });
        }
        self.current_slide_index = slide;
        Ok(())
    }

    /// Stamp `last_updated`; called by the store on every save.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

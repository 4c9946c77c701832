mod catalog;
mod ids;
mod slide_progress;
mod video_progress;

pub use catalog::{DocumentInfo, DocumentKind, TrainingVideo};
pub use ids::VideoId;
pub use slide_progress::{SlideProgress, SlideProgressError};
pub use video_progress::{VideoProgress, VideoProgressError, COMPLETION_TOLERANCE_SECS};

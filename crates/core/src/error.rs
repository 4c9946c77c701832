use thiserror::Error;

use crate::model::{SlideProgressError, VideoProgressError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SlideProgress(#[from] SlideProgressError),
    #[error(transparent)]
    VideoProgress(#[from] VideoProgressError),
}

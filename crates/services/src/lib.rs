#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use training_core::Clock;

pub use error::{TrainingError, VideoError};
pub use sessions::{
    flush_on_exit, MediaEvent, PlayerCommand, SlideSessionService, VideoSessionService,
};

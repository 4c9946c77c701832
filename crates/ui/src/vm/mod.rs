mod time_fmt;
mod training_vm;
mod video_vm;

pub use time_fmt::format_time;
pub use training_vm::{notice_message, TrainingVm};
pub use video_vm::VideoVm;

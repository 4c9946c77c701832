mod documents;
mod training;
mod video_player;

pub use documents::DocumentsView;
pub use training::TrainingView;
pub use video_player::VideoCatalog;

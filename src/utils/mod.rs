pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{checkpoint_file_name, DataLayout};
pub use progress::ProgressReporter;

mod catalog;
mod cleaner;
mod error;
mod estimate;
mod format;
mod fs;
mod path;
mod progress;
pub mod scan;
mod sudo;
mod usage;

pub use catalog::*;
pub use cleaner::*;
pub use error::*;
pub use estimate::*;
pub use format::*;
pub use fs::*;
pub use path::*;
pub use progress::*;
pub use scan::{BigFile, DuplicateGroup, OldFile};
pub use sudo::*;
pub use usage::*;

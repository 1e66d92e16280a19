mod errors;
mod git;
mod indexer;
mod scan;
mod types;

pub use errors::{Error, IndexResult};
pub use git::{changed_files_since, clone_or_fetch};
pub use indexer::Indexer;
pub use scan::scan_repo_files;
pub use types::{IndexProgress, IndexStats, IndexStep};

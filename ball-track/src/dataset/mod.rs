//! Dataset indexing and sampling toolkit.

mod dataset_;
mod index;
mod record;
mod split;
mod streaming;

pub use dataset_::*;
pub use index::*;
pub use record::*;
pub use split::*;
pub use streaming::*;

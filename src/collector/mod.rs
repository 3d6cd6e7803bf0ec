//! procfs access: the filesystem abstraction and the pure parsers.

pub mod mock;
pub mod procfs;
pub mod traits;

pub use procfs::{ProcError, SysClock};
pub use traits::{FileSystem, RealFs};

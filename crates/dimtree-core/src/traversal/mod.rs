pub mod mirror;
pub mod path;

pub use mirror::{resolve, resolve_with_substitution, Resolved};
pub use path::{build_path, Path, PathStep, PathTarget};

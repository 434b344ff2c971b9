pub mod container;
pub mod entry;
pub mod set;

pub use container::{ChildGroup, Container};
pub use entry::{Entry, EntryKind, Record};
pub use set::{Coord, IndexSet, IndexValue, SetProduct};

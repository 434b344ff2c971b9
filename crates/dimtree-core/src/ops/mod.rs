pub mod store;

pub use store::Model;

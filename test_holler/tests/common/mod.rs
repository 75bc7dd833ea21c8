pub mod handle;
pub mod names;

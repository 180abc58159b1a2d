//! File-backed reference source and result store

pub mod reference_file;
pub mod result_file;

pub use reference_file::FileReference;
pub use result_file::FileResultStore;

//! Local storage infrastructure module

mod local_file;

pub use local_file::LocalFileSaver;

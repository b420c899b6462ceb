//! I/O around the analysis core: decoding, export, reporting, options files

pub mod audio;
pub mod export;
pub mod project;
pub mod report;

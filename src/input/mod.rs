//! Job-offer input: inline text or a .txt, .md or .pdf file

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use manager::{InputManager, JobSource};

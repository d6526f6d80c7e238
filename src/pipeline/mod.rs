pub mod aggregate;
pub mod augment;
pub mod correlate;
pub mod motion;
pub mod parse;
pub mod summary;

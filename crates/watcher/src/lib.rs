pub mod runner;
pub mod source;

pub use source::WarpcastSource;

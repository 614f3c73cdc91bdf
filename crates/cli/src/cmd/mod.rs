mod build;
mod minify;

pub use build::cmd_build;
pub use minify::cmd_minify;

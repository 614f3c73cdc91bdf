//! luapack-lib: bundling and minification pipeline for Lua projects.
//!
//! An entry unit is flattened into one self-contained file by inlining
//! every `require` directive, filtered for debug-only blocks and embed
//! directives, then lexically minified:
//! - `resolve`: recursive module inlining with duplicate/cycle dedup
//! - `filter`: debug-block removal and file embedding
//! - `minify`: tokenizing re-emitter dropping comments and whitespace
//! - `pipeline`: per-artifact orchestration of the stages above
//! - `verify`: load-only compile check of a finished artifact

pub mod consts;
pub mod filter;
pub mod minify;
pub mod pipeline;
pub mod resolve;
pub mod verify;

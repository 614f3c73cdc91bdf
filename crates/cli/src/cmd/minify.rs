//! Implementation of the `luapack minify` command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use luapack_lib::minify::minify;

/// Minify a single file and print the result to stdout.
///
/// The minifier is a pure text transform, so this needs no project
/// layout; it is useful for inspecting what the build pipeline would
/// emit for one unit.
pub fn cmd_minify(file: &Path) -> Result<()> {
  let text = fs::read_to_string(file).with_context(|| format!("cannot read '{}'", file.display()))?;
  let minified = minify(&text).with_context(|| format!("cannot minify '{}'", file.display()))?;
  println!("{}", minified);
  Ok(())
}

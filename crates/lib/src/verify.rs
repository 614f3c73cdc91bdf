//! Load-time verification of generated artifacts.
//!
//! The pipeline's worst failure mode is emitting text that no longer
//! tokenizes the way the source did. Compiling the finished artifact in
//! a throwaway Lua state (load only, never executed) catches that class
//! of defect before anything reaches disk.

use mlua::Lua;
use thiserror::Error;

/// Errors from artifact verification.
#[derive(Debug, Error)]
pub enum VerifyError {
  #[error("artifact '{name}' does not compile: {message}")]
  Load { name: String, message: String },
}

/// Compile `text` in a fresh Lua state without executing it.
pub fn check_loads(name: &str, text: &str) -> Result<(), VerifyError> {
  let lua = Lua::new();
  lua
    .load(text)
    .set_name(format!("@{name}"))
    .into_function()
    .map(|_| ())
    .map_err(|e| VerifyError::Load {
      name: name.to_string(),
      message: e.to_string(),
    })
}

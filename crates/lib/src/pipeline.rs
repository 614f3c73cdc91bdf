//! Per-artifact build pipeline.
//!
//! Each requested artifact runs the same stage sequence: module
//! resolution, debug-block removal (stripped builds only), embed
//! substitution, minification plus banner (stripped builds only),
//! load verification, write. All state is artifact-local; sibling builds
//! share nothing, so a failed artifact never poisons the others.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::consts::{DEFAULT_OUT_DIR, LUA_EXT, SRC_DIR, VERSION_FILE};
use crate::filter::{self, FilterError};
use crate::minify::{MinifyError, minify};
use crate::resolve::{ResolveError, resolve};
use crate::verify::{self, VerifyError};

/// How an artifact is post-processed after module resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  /// Debug blocks removed, comments and whitespace stripped, banner added.
  Stripped,
  /// Debug blocks, comments and whitespace kept verbatim.
  Full,
}

/// One requested output artifact.
#[derive(Debug, Clone)]
pub struct Target {
  /// Selector name on the command line; also the artifact file stem.
  pub name: &'static str,
  /// Entry unit, relative to the project root.
  pub entry: PathBuf,
  pub mode: BuildMode,
}

impl Target {
  fn new(name: &'static str, mode: BuildMode) -> Self {
    Self {
      name,
      entry: Path::new(SRC_DIR).join(format!("{name}.{LUA_EXT}")),
      mode,
    }
  }
}

/// The targets a default project layout can build. Order matters: the
/// standalone entry embeds the stripped artifacts, so it comes last.
pub fn default_targets() -> Vec<Target> {
  vec![
    Target::new("compiler", BuildMode::Stripped),
    Target::new("runtime", BuildMode::Stripped),
    Target::new("standalone", BuildMode::Full),
  ]
}

/// Look up a default target by selector name.
pub fn find_target(name: &str) -> Option<Target> {
  default_targets().into_iter().find(|t| t.name == name)
}

/// Build-wide options shared by every requested target.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Project root containing `src/` and `version.txt`.
  pub root: PathBuf,
  /// Output directory for artifacts.
  pub out_dir: PathBuf,
  /// Compile the finished text in a throwaway Lua state before writing.
  pub verify: bool,
}

impl BuildOptions {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let out_dir = root.join(DEFAULT_OUT_DIR);
    Self {
      root,
      out_dir,
      verify: true,
    }
  }
}

/// Summary of one successfully built artifact.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub target: String,
  pub mode: BuildMode,
  pub path: PathBuf,
  /// Size of the fully resolved source before filtering and minification.
  pub source_bytes: usize,
  /// Size of the text written to disk.
  pub artifact_bytes: usize,
}

/// Errors from any stage of an artifact build.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("resolve error: {0}")]
  Resolve(#[from] ResolveError),

  #[error("filter error: {0}")]
  Filter(#[from] FilterError),

  #[error("minify error: {0}")]
  Minify(#[from] MinifyError),

  #[error("verify error: {0}")]
  Verify(#[from] VerifyError),

  #[error("cannot write artifact '{path}': {message}")]
  WriteArtifact { path: String, message: String },
}

/// Build a single artifact.
///
/// Nothing is written until every stage, verification included, has
/// succeeded, so a fatal error never leaves a partial file behind.
pub fn build_target(target: &Target, options: &BuildOptions) -> Result<BuildReport, BuildError> {
  info!(target = target.name, "building artifact");

  let resolved = resolve(&options.root, &target.entry)?;
  let source_bytes = resolved.len();

  let filtered = match target.mode {
    BuildMode::Stripped => filter::strip_debug_blocks(&resolved)?,
    BuildMode::Full => resolved,
  };
  let embedded = filter::embed_files(&filtered, &options.root, &options.out_dir)?;

  let text = match target.mode {
    BuildMode::Stripped => {
      let version = load_version(&options.root);
      format!("{}{}", banner(target.name, &version), minify(&embedded)?)
    }
    BuildMode::Full => embedded,
  };

  if options.verify {
    verify::check_loads(target.name, &text)?;
  }

  fs::create_dir_all(&options.out_dir).map_err(|e| BuildError::WriteArtifact {
    path: options.out_dir.display().to_string(),
    message: e.to_string(),
  })?;
  let path = options.out_dir.join(format!("{}.{}", target.name, LUA_EXT));
  fs::write(&path, &text).map_err(|e| BuildError::WriteArtifact {
    path: path.display().to_string(),
    message: e.to_string(),
  })?;

  info!(target = target.name, bytes = text.len(), path = %path.display(), "artifact written");

  Ok(BuildReport {
    target: target.name.to_string(),
    mode: target.mode,
    path,
    source_bytes,
    artifact_bytes: text.len(),
  })
}

/// Read the project version from the first line of `version.txt`.
///
/// The version only feeds the artifact banner, so an unreadable or empty
/// file downgrades to a warning and `0.0.0`.
pub fn load_version(root: &Path) -> String {
  let path = root.join(VERSION_FILE);
  match fs::read_to_string(&path) {
    Ok(text) => {
      let version = text.lines().next().unwrap_or("").trim().to_string();
      if version.is_empty() {
        warn!(path = %path.display(), "version file is empty, using 0.0.0");
        "0.0.0".to_string()
      } else {
        version
      }
    }
    Err(e) => {
      warn!(path = %path.display(), error = %e, "version file unreadable, using 0.0.0");
      "0.0.0".to_string()
    }
  }
}

fn banner(target: &str, version: &str) -> String {
  format!(
    "--[[{target} v{version}, bundled by luapack]]\n--[[This build has been minified to reduce file size]]\n"
  )
}

//! Debug-block removal and file embedding.
//!
//! Both passes run over fully resolved text. Debug removal must run
//! before embed substitution so that a directive inside a deleted debug
//! region is never resolved (and its target never read).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{DEBUG_BEGIN, DEBUG_END, DEFAULT_OUT_DIR, EMBED_BEGIN, EMBED_END};

/// Errors that can occur while filtering resolved text.
#[derive(Debug, Error)]
pub enum FilterError {
  #[error("debug block opened on line {line} is never closed")]
  UnterminatedDebugBlock { line: usize },

  #[error("nested debug block: marker on line {inner} inside the block opened on line {outer}")]
  NestedDebugBlock { outer: usize, inner: usize },

  #[error("embed directive on line {line} is malformed: expected a quoted file path")]
  MalformedEmbed { line: usize },

  #[error("embed directive on line {line} is never closed")]
  UnterminatedEmbed { line: usize },

  #[error("cannot read embed target '{path}': {message}")]
  EmbedTargetUnreadable { path: String, message: String },
}

/// Delete every debug-only block, delimiters included.
///
/// Blocks are matched to the nearest closing marker. A second opening
/// marker before the close is rejected rather than silently mis-paired;
/// a stray closing marker with no opener is left verbatim, since it is a
/// well-formed comment on its own.
pub fn strip_debug_blocks(text: &str) -> Result<String, FilterError> {
  let mut out = String::with_capacity(text.len());
  let mut pos = 0;

  while let Some(rel) = text[pos..].find(DEBUG_BEGIN) {
    let begin = pos + rel;
    let after = begin + DEBUG_BEGIN.len();

    let Some(rel_end) = text[after..].find(DEBUG_END) else {
      return Err(FilterError::UnterminatedDebugBlock {
        line: line_of(text, begin),
      });
    };
    let end = after + rel_end;

    if let Some(rel_inner) = text[after..end].find(DEBUG_BEGIN) {
      return Err(FilterError::NestedDebugBlock {
        outer: line_of(text, begin),
        inner: line_of(text, after + rel_inner),
      });
    }

    debug!(line = line_of(text, begin), "removing debug block");
    out.push_str(&text[pos..begin]);
    pos = end + DEBUG_END.len();
  }

  out.push_str(&text[pos..]);
  Ok(out)
}

/// Replace every embed directive with a quoted literal of its target file.
///
/// The whole directive span is replaced, markers included; any text
/// between the markers is discarded. Target content is trimmed, carriage
/// returns are deleted, and the result is escaped onto a single line:
/// backslashes first, then newlines, then double quotes.
pub fn embed_files(text: &str, root: &Path, out_dir: &Path) -> Result<String, FilterError> {
  let mut out = String::with_capacity(text.len());
  let mut pos = 0;

  while let Some(rel) = text[pos..].find(EMBED_BEGIN) {
    let begin = pos + rel;
    let line = line_of(text, begin);
    let after = begin + EMBED_BEGIN.len();

    let Some((param, param_len)) = parse_embed_param(&text[after..]) else {
      return Err(FilterError::MalformedEmbed { line });
    };
    let body_start = after + param_len;

    let Some(rel_end) = text[body_start..].find(EMBED_END) else {
      return Err(FilterError::UnterminatedEmbed { line });
    };
    let end = body_start + rel_end + EMBED_END.len();

    let target = resolve_embed_path(&param, root, out_dir);
    let content = fs::read_to_string(&target).map_err(|e| FilterError::EmbedTargetUnreadable {
      path: target.display().to_string(),
      message: e.to_string(),
    })?;

    debug!(path = %target.display(), bytes = content.len(), "embedding file");
    out.push_str(&text[pos..begin]);
    out.push('"');
    out.push_str(&escape_literal(&content));
    out.push('"');
    pos = end;
  }

  out.push_str(&text[pos..]);
  Ok(out)
}

/// Parse the quoted path parameter after an opening embed marker.
///
/// Returns the path and the number of bytes consumed up to and including
/// the closing `]]` of the opening marker.
fn parse_embed_param(rest: &str) -> Option<(String, usize)> {
  let bytes = rest.as_bytes();
  let mut i = 0;

  while bytes.get(i) == Some(&b' ') {
    i += 1;
  }
  let quote = match bytes.get(i) {
    Some(b'\'') => '\'',
    Some(b'"') => '"',
    _ => return None,
  };

  let path_start = i + 1;
  let rel_close = rest[path_start..].find(quote)?;
  let path_end = path_start + rel_close;
  if path_start == path_end {
    return None;
  }

  let mut i = path_end + 1;
  while bytes.get(i) == Some(&b' ') {
    i += 1;
  }
  if !rest[i..].starts_with("]]") {
    return None;
  }

  Some((rest[path_start..path_end].to_string(), i + 2))
}

/// Resolve an embed target path.
///
/// Paths written against the default output directory name an artifact
/// from an earlier build stage; those are remapped onto the active output
/// directory. Everything else resolves against the project root.
fn resolve_embed_path(path: &str, root: &Path, out_dir: &Path) -> PathBuf {
  match path.strip_prefix(&format!("{DEFAULT_OUT_DIR}/")) {
    Some(rest) => out_dir.join(rest),
    None => root.join(path),
  }
}

fn escape_literal(content: &str) -> String {
  content
    .trim()
    .replace('\r', "")
    .replace('\\', "\\\\")
    .replace('\n', "\\n")
    .replace('"', "\\\"")
}

fn line_of(text: &str, offset: usize) -> usize {
  text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

//! Recursive module inlining.
//!
//! Replaces every `require "dot.separated.name"` directive in an entry
//! unit with the referenced module's full text, producing one
//! self-contained buffer. A module is spliced in at its first reference
//! only; later references to the same module are deleted, which is what
//! makes repeated and cyclic imports terminate instead of duplicating
//! top-level definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::LUA_EXT;

/// Errors that can occur while inlining modules.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("cannot read entry '{path}': {message}")]
  EntryUnreadable { path: String, message: String },

  #[error("cannot read module '{module}' (expected at '{path}'): {message}")]
  ModuleUnreadable {
    module: String,
    path: String,
    message: String,
  },
}

/// A `require` directive located in the working buffer.
struct Directive {
  start: usize,
  end: usize,
  name: String,
}

/// Inline all `require` directives reachable from `entry`.
///
/// `entry` is resolved against `root`, as is every module path derived
/// from a directive (dots become path separators, `.lua` is appended).
/// The returned text contains no remaining directives.
pub fn resolve(root: &Path, entry: &Path) -> Result<String, ResolveError> {
  let entry_path = root.join(entry);
  let mut text = fs::read_to_string(&entry_path).map_err(|e| ResolveError::EntryUnreadable {
    path: entry_path.display().to_string(),
    message: e.to_string(),
  })?;

  let mut inlined: HashSet<PathBuf> = HashSet::new();
  inlined.insert(entry_path);

  while let Some(directive) = find_directive(&text) {
    let path = root.join(module_path(&directive.name));

    if inlined.contains(&path) {
      // Already spliced in once; a second copy would duplicate
      // top-level definitions.
      debug!(module = %directive.name, "dropping repeated require");
      text.replace_range(directive.start..directive.end, "");
      continue;
    }

    let module_text = fs::read_to_string(&path).map_err(|e| ResolveError::ModuleUnreadable {
      module: directive.name.clone(),
      path: path.display().to_string(),
      message: e.to_string(),
    })?;

    debug!(module = %directive.name, bytes = module_text.len(), "splicing module");
    text.replace_range(directive.start..directive.end, &module_text);
    inlined.insert(path);
  }

  Ok(text)
}

/// Map a dot-separated module name to its path relative to the project root.
fn module_path(name: &str) -> PathBuf {
  PathBuf::from(format!("{}.{}", name.replace('.', "/"), LUA_EXT))
}

/// Find the leftmost remaining `require` directive.
///
/// The keyword may be followed by any number of spaces and either quote
/// style; it must not be the tail of a longer identifier.
fn find_directive(text: &str) -> Option<Directive> {
  let bytes = text.as_bytes();
  let mut from = 0;

  while let Some(rel) = text[from..].find("require") {
    let start = from + rel;
    from = start + "require".len();

    if start > 0 {
      let prev = bytes[start - 1];
      if prev.is_ascii_alphanumeric() || prev == b'_' {
        continue;
      }
    }

    let mut cursor = start + "require".len();
    while bytes.get(cursor) == Some(&b' ') {
      cursor += 1;
    }
    let quote = match bytes.get(cursor) {
      Some(b'\'') => '\'',
      Some(b'"') => '"',
      _ => continue,
    };

    let name_start = cursor + 1;
    let Some(rel_close) = text[name_start..].find(quote) else {
      continue;
    };
    let name_end = name_start + rel_close;
    if name_start == name_end {
      continue;
    }

    return Some(Directive {
      start,
      end: name_end + 1,
      name: text[name_start..name_end].to_string(),
    });
  }

  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
  }

  #[test]
  fn inlines_referenced_module() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require \"util\"\nreturn util.x\n");
    write(temp.path(), "util.lua", "util = { x = 1 }");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text, "util = { x = 1 }\nreturn util.x\n");
  }

  #[test]
  fn maps_dotted_names_to_nested_paths() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require \"lib.util\"");
    write(temp.path(), "lib/util.lua", "-- nested");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text, "-- nested");
  }

  #[test]
  fn repeated_require_is_spliced_once() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require \"util\"\nrequire \"util\"\ndone = true\n");
    write(temp.path(), "util.lua", "UTIL = 1");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text.matches("UTIL = 1").count(), 1);
    assert!(!text.contains("require"));
  }

  #[test]
  fn cyclic_requires_terminate() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.lua", "A = 1\nrequire \"b\"\n");
    write(temp.path(), "b.lua", "B = 2\nrequire \"a\"\n");

    let text = resolve(temp.path(), Path::new("a.lua")).unwrap();
    assert_eq!(text.matches("A = 1").count(), 1);
    assert_eq!(text.matches("B = 2").count(), 1);
    assert!(!text.contains("require"));
  }

  #[test]
  fn transitive_duplicate_is_deduped() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require \"a\"\nrequire \"b\"\n");
    write(temp.path(), "a.lua", "require \"shared\"\nA = 1\n");
    write(temp.path(), "b.lua", "require \"shared\"\nB = 2\n");
    write(temp.path(), "shared.lua", "SHARED = 0");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text.matches("SHARED = 0").count(), 1);
  }

  #[test]
  fn single_quotes_and_no_space_accepted() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require'util'");
    write(temp.path(), "util.lua", "ok = true");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text, "ok = true");
  }

  #[test]
  fn keyword_inside_identifier_is_not_a_directive() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "myrequire \"util\"\n");

    let text = resolve(temp.path(), Path::new("main.lua")).unwrap();
    assert_eq!(text, "myrequire \"util\"\n");
  }

  #[test]
  fn missing_module_is_fatal() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "main.lua", "require \"nope\"");

    let err = resolve(temp.path(), Path::new("main.lua")).unwrap_err();
    match err {
      ResolveError::ModuleUnreadable { module, .. } => assert_eq!(module, "nope"),
      other => panic!("expected ModuleUnreadable, got {other}"),
    }
  }

  #[test]
  fn missing_entry_is_fatal() {
    let temp = TempDir::new().unwrap();
    let err = resolve(temp.path(), Path::new("absent.lua")).unwrap_err();
    assert!(matches!(err, ResolveError::EntryUnreadable { .. }));
  }
}

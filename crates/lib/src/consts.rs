//! Directive markers and default project layout.

/// Extension appended when mapping a module name to a source file.
pub const LUA_EXT: &str = "lua";

/// Opening marker of a debug-only block. A well-formed Lua comment on its
/// own, so unprocessed source stays loadable.
pub const DEBUG_BEGIN: &str = "--[[minify-delete]]";

/// Closing marker of a debug-only block.
pub const DEBUG_END: &str = "--[[/minify-delete]]";

/// Opening marker of an embed directive, followed by a quoted file path
/// and `]]`.
pub const EMBED_BEGIN: &str = "--[[build-embed";

/// Closing marker of an embed directive.
pub const EMBED_END: &str = "--[[/build-embed]]";

/// Directory holding source units, relative to the project root.
pub const SRC_DIR: &str = "src";

/// Default output directory, relative to the project root. Embed paths
/// written against this prefix are remapped onto the active output
/// directory.
pub const DEFAULT_OUT_DIR: &str = "build";

/// File in the project root whose first line is the project version.
pub const VERSION_FILE: &str = "version.txt";

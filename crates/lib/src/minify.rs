//! Lexical minification of Lua source text.
//!
//! A single left-to-right cursor classifies the text into tokens using an
//! ordered list of classifiers (block comment, line comment, strings,
//! word runs, operator runs, whitespace) and re-emits it with comments
//! dropped and whitespace collapsed to the minimum that keeps adjacent
//! tokens from fusing. The transform is pure and total over lexically
//! well-formed input; anything the classifiers cannot place is a fatal
//! error rather than a silent skip, since skipping would corrupt the
//! emitted program.

use thiserror::Error;

/// Fatal tokenizer errors. Each one identifies the source position so a
/// classifier gap is distinguishable from a real syntax problem.
#[derive(Debug, Error)]
pub enum MinifyError {
  #[error("unrecognized character {ch:?} at line {line}, column {column}")]
  UnrecognizedChar { ch: char, line: usize, column: usize },

  #[error("unterminated string opened at line {line}, column {column}")]
  UnterminatedString { line: usize, column: usize },

  #[error("unterminated block comment opened at line {line}, column {column}")]
  UnterminatedComment { line: usize, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
  BlockComment,
  LineComment,
  String,
  Word,
  Operator,
  Whitespace,
}

struct Token<'a> {
  kind: TokenKind,
  text: &'a str,
}

/// Minify `text`, dropping comments and collapsing whitespace.
///
/// Word runs are emitted with exactly one trailing space so two adjacent
/// identifier-like tokens can never fuse; strings and operator runs
/// reclaim that pad, since they separate themselves. Minifying already
/// minified text returns it unchanged.
pub fn minify(text: &str) -> Result<String, MinifyError> {
  let mut scanner = Scanner::new(text);
  let mut out = String::with_capacity(text.len());

  while let Some(token) = scanner.next_token()? {
    match token.kind {
      TokenKind::BlockComment | TokenKind::LineComment | TokenKind::Whitespace => {}
      TokenKind::Word => {
        out.push_str(token.text);
        out.push(' ');
      }
      TokenKind::String | TokenKind::Operator => {
        if out.ends_with(' ') {
          out.pop();
        }
        // Two minus tokens must not fuse into a comment marker.
        if token.kind == TokenKind::Operator && token.text.starts_with('-') && out.ends_with('-') {
          out.push(' ');
        }
        out.push_str(token.text);
      }
    }
  }

  if out.ends_with(' ') {
    out.pop();
  }
  Ok(out)
}

struct Scanner<'a> {
  text: &'a str,
  pos: usize,
}

impl<'a> Scanner<'a> {
  fn new(text: &'a str) -> Self {
    Self { text, pos: 0 }
  }

  /// Classify the token at the cursor. Classifiers run in a fixed
  /// priority order and the first match wins; exactly one must match or
  /// the input is malformed.
  fn next_token(&mut self) -> Result<Option<Token<'a>>, MinifyError> {
    let rest = &self.text[self.pos..];
    let Some(first) = rest.chars().next() else {
      return Ok(None);
    };
    let prev = self.text[..self.pos].chars().next_back();

    if rest.starts_with("--[[") && comment_can_start(prev) {
      let Some(rel) = rest[4..].find("]]") else {
        let (line, column) = line_col(self.text, self.pos);
        return Err(MinifyError::UnterminatedComment { line, column });
      };
      return Ok(Some(self.take(4 + rel + 2, TokenKind::BlockComment)));
    }

    if rest.starts_with("--") && comment_can_start(prev) {
      let len = rest.find('\n').unwrap_or(rest.len());
      return Ok(Some(self.take(len, TokenKind::LineComment)));
    }

    if first == '\'' || first == '"' {
      let len = self.scan_string(first)?;
      return Ok(Some(self.take(len, TokenKind::String)));
    }

    if is_word_char(first) {
      let len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
      return Ok(Some(self.take(len, TokenKind::Word)));
    }

    if is_operator_char(first) {
      let len = scan_operator_run(rest);
      return Ok(Some(self.take(len, TokenKind::Operator)));
    }

    if first.is_ascii_whitespace() {
      let len = rest
        .find(|c: char| !c.is_ascii_whitespace())
        .unwrap_or(rest.len());
      return Ok(Some(self.take(len, TokenKind::Whitespace)));
    }

    let (line, column) = line_col(self.text, self.pos);
    Err(MinifyError::UnrecognizedChar {
      ch: first,
      line,
      column,
    })
  }

  fn take(&mut self, len: usize, kind: TokenKind) -> Token<'a> {
    let text: &'a str = self.text;
    let token = Token {
      kind,
      text: &text[self.pos..self.pos + len],
    };
    self.pos += len;
    token
  }

  /// Length of the string token at the cursor, opening quote included.
  /// A quote preceded by a backslash does not terminate the string.
  fn scan_string(&self, quote: char) -> Result<usize, MinifyError> {
    let rest = &self.text[self.pos..];
    let mut chars = rest.char_indices();
    chars.next();

    let mut escaped = false;
    for (i, c) in chars {
      if escaped {
        escaped = false;
      } else if c == '\\' {
        escaped = true;
      } else if c == quote {
        return Ok(i + c.len_utf8());
      }
    }

    let (line, column) = line_col(self.text, self.pos);
    Err(MinifyError::UnterminatedString { line, column })
  }
}

/// Context check for a `--` candidate: immediately after a quote or
/// another dash it reads as operator characters, not a comment opener.
fn comment_can_start(prev: Option<char>) -> bool {
  !matches!(prev, Some('\'' | '"' | '-'))
}

/// Length of the operator run starting at the cursor. The run stops
/// before any interior `--` that would start a comment under the same
/// context rule the comment classifiers use, so `x=--[[c]]y` still drops
/// its comment while a dash-preceded `--` stays in the run.
fn scan_operator_run(rest: &str) -> usize {
  let bytes = rest.as_bytes();
  let mut len = 0;

  while len < bytes.len() && is_operator_char(bytes[len] as char) {
    if len > 0 && bytes[len] == b'-' && bytes.get(len + 1) == Some(&b'-') && bytes[len - 1] != b'-' {
      break;
    }
    len += 1;
  }

  len
}

fn is_word_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

/// Lua's operator and punctuation alphabet. Anything outside it (and the
/// other classifier alphabets) is malformed input, not pass-through.
fn is_operator_char(c: char) -> bool {
  matches!(
    c,
    '+'
      | '-'
      | '*'
      | '/'
      | '%'
      | '^'
      | '#'
      | '&'
      | '~'
      | '|'
      | '<'
      | '>'
      | '='
      | '('
      | ')'
      | '{'
      | '}'
      | '['
      | ']'
      | ';'
      | ':'
      | ','
      | '.'
  )
}

fn line_col(text: &str, offset: usize) -> (usize, usize) {
  let before = &text[..offset];
  let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
  let column = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
  (line, column)
}

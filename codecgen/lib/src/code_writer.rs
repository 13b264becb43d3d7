//! Indentation-tracking writer for C-like target languages.
//!
//! The built-in templates emit Java and C++ through a [`CodeWriter`]. Output
//! always goes into an owned `String`, so plain writes cannot fail. Block
//! helpers take closures that may fail with the template's own error type,
//! which lets a missing type mapping unwind out of any nesting depth with `?`.
//!
//! ```
//! use codecgen::code_writer::CodeWriter;
//!
//! let mut w = CodeWriter::new("    ");
//! w.block("class Example", |w| {
//!     w.line("int value;");
//!     Ok::<_, ()>(())
//! })
//! .unwrap();
//!
//! assert_eq!(w.finish(), "class Example {\n    int value;\n}\n");
//! ```

/// A string builder that indents each line by the current depth.
#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    indent: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new(indent: &str) -> Self {
        Self {
            out: String::new(),
            indent: indent.to_string(),
            depth: 0,
        }
    }

    /// Writes one indented line. Embedded newlines are indented too.
    pub fn line(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().split('\n') {
            if !line.trim().is_empty() {
                for _ in 0..self.depth {
                    self.out.push_str(&self.indent);
                }
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
    }

    /// Writes every line of `text` with `prefix` in front.
    pub fn comment(&mut self, prefix: &str, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.line(prefix.trim_end());
            } else {
                self.line(format!("{prefix}{line}"));
            }
        }
    }

    /// Runs `body` one level deeper.
    pub fn indented<E>(&mut self, body: impl FnOnce(&mut Self) -> Result<(), E>) -> Result<(), E> {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    /// Writes `header {`, the indented body, then `}`.
    pub fn block<E>(
        &mut self,
        header: &str,
        body: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        self.block_with_close(header, "}", body)
    }

    /// Like [`CodeWriter::block`] with a custom closing line, such as `};`.
    pub fn block_with_close<E>(
        &mut self,
        header: &str,
        close: &str,
        body: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        self.line(format!("{header} {{"));
        self.indented(body)?;
        self.line(close);
        Ok(())
    }

    pub fn finish(self) -> String {
        self.out
    }
}

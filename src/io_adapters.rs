use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// Where the shell gets its input lines from.
pub trait LineSource {
    /// Read the next line without its line break.
    ///
    /// `Ok(None)` means end of input. An error means only this line is lost;
    /// the caller may keep reading.
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// Non-interactive source over any buffered reader, e.g. piped stdin.
///
/// No prompt is shown.
pub struct ReaderLines<R> {
    reader: R,
    buf: String,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = self
            .reader
            .read_line(&mut self.buf)
            .context("failed to read input line")?;
        if read == 0 {
            return Ok(None);
        }
        let line = match self.buf.strip_suffix('\n') {
            Some(line) => line.strip_suffix('\r').unwrap_or(line),
            None => &self.buf,
        };
        Ok(Some(line.to_string()))
    }
}

/// Interactive source with line editing and history.
pub struct EditorLines {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorLines {
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new().context("failed to set up line editor")?,
            prompt: prompt.into(),
        })
    }
}

impl LineSource for EditorLines {
    fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the line being edited.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read input line"),
        }
    }
}

// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Where product links come from: the interactive prompt, or plain lines
//! on stdin when output must stay machine-readable.

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::io::BufRead;
use std::path::PathBuf;

pub const PROMPT: &str = "Audible link: ";

/// A stream of links, one per call. An empty string means the user is done.
pub trait UrlSource {
    fn next_url(&mut self) -> anyhow::Result<String>;
}

/// Line editor for product links, with history kept across runs.
pub struct UrlPrompt {
    editor: Editor<(), DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl UrlPrompt {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .max_history_size(200)?
            .build();
        let mut editor: Editor<(), DefaultHistory> = Editor::with_config(config)?;

        let history_path =
            dirs::home_dir().map(|home| home.join(".audible-scrape").join("history"));
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Read one line. Ctrl-C and Ctrl-D read as an empty line.
    pub fn read(&mut self) -> anyhow::Result<String> {
        match self.editor.readline(PROMPT) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl UrlSource for UrlPrompt {
    fn next_url(&mut self) -> anyhow::Result<String> {
        self.read()
    }
}

impl Drop for UrlPrompt {
    fn drop(&mut self) {
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Reads one link per line without printing a prompt. End of input reads as
/// an empty line.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> UrlSource for LineSource<R> {
    fn next_url(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn line_source_trims_and_ends_empty() {
        let mut source = LineSource::new(Cursor::new("  https://a.example/pd/1 \n\nhttps://b\n"));
        assert_eq!(source.next_url().unwrap(), "https://a.example/pd/1");
        assert_eq!(source.next_url().unwrap(), "");
        assert_eq!(source.next_url().unwrap(), "https://b");
        assert_eq!(source.next_url().unwrap(), "");
        assert_eq!(source.next_url().unwrap(), "");
    }
}

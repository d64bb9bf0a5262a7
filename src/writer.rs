use crate::error::{DocgenError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Writes finished Markdown to its destination.
pub struct MarkdownWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
    target: PathBuf,
}

impl MarkdownWriter<File> {
    /// Creates (or truncates) the file at `path`.
    pub async fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .await
            .map_err(|e| DocgenError::io(path, e))?;
        Ok(Self::new(file, path))
    }
}

impl MarkdownWriter<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout(), Path::new("<stdout>"))
    }
}

impl<W: AsyncWrite + Unpin> MarkdownWriter<W> {
    pub fn new(inner: W, target: &Path) -> Self {
        Self {
            writer: BufWriter::new(inner),
            target: target.to_path_buf(),
        }
    }

    /// Writes `markdown`, ensuring it ends with a newline.
    pub async fn write_document(&mut self, markdown: &str) -> Result<()> {
        debug!("Writing {} bytes to {}", markdown.len(), self.target.display());

        self.writer
            .write_all(markdown.as_bytes())
            .await
            .map_err(|e| DocgenError::io(&self.target, e))?;

        if !markdown.ends_with('\n') {
            self.writer
                .write_all(b"\n")
                .await
                .map_err(|e| DocgenError::io(&self.target, e))?;
        }

        self.flush().await
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .map_err(|e| DocgenError::io(&self.target, e))
    }
}

/// Writes `markdown` to `output`, or to stdout when no path is given.
pub async fn write_output(output: Option<&Path>, markdown: &str) -> Result<()> {
    match output {
        Some(path) => MarkdownWriter::create(path).await?.write_document(markdown).await,
        None => MarkdownWriter::stdout().write_document(markdown).await,
    }
}

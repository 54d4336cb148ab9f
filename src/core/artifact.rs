use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::context::RunContext;
use crate::error::{DiagError, Result};

/// A file produced by a run, from creation through finalization.
///
/// Writes always go to the originally-configured path; the rename to the
/// identity-bearing name happens exactly once, after the last append. A
/// reader therefore never observes a half-written file under its final
/// name. If the process is killed mid-run, the un-renamed file is the
/// recovery artifact: valid up to the last completed append.
#[derive(Debug)]
pub struct OutputArtifact {
    path: PathBuf,
    file: File,
}

impl OutputArtifact {
    /// Open the performance time-series artifact.
    ///
    /// The header is written only when the path does not already exist, so
    /// repeated invocations against the same path keep appending rows under
    /// a single header line.
    pub fn open_performance(path: &Path, header: &str) -> Result<Self> {
        let needs_header = !path.exists();

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_header {
            writeln!(file, "{}", header)?;
        }

        Ok(OutputArtifact {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Create the inventory artifact fresh for this run, starting with the
    /// identity line (hostname + run timestamp).
    pub fn create_inventory(path: &Path, ctx: &RunContext) -> Result<Self> {
        let mut file = File::create(path)?;
        writeln!(file, "{} - {}", ctx.hostname, ctx.started_at_display())?;

        Ok(OutputArtifact {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single line.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{}", line)?;
        Ok(())
    }

    /// Append pre-formatted text as-is.
    pub fn append(&mut self, text: &str) -> Result<()> {
        self.file.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Rename the artifact to its final, identity-bearing name and close it.
    ///
    /// Returns the destination path. No further writes are possible.
    pub fn finalize(self, ctx: &RunContext) -> Result<PathBuf> {
        let OutputArtifact { path, file } = self;

        file.sync_all()?;
        // The handle must be closed before the rename on platforms that
        // lock open files.
        drop(file);

        let dest = finalized_path(&path, ctx)?;
        fs::rename(&path, &dest)?;
        Ok(dest)
    }
}

/// Compute the final name: `<hostname>-<run-stamp>-<base name>` in the
/// artifact's original directory.
pub fn finalized_path(path: &Path, ctx: &RunContext) -> Result<PathBuf> {
    let base = path
        .file_name()
        .ok_or_else(|| DiagError::config(format!("Output path has no file name: {:?}", path)))?;

    let final_name = format!(
        "{}-{}-{}",
        ctx.hostname,
        ctx.run_stamp,
        base.to_string_lossy()
    );

    Ok(path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(final_name))
}

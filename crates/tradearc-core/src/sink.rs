//! Output directory for one run: `<root>/<label>/`.
//!
//! Files are written to `<name>.part`, synced, then renamed into place so a
//! reader never sees a half-written archive.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::summary::RunSummary;

pub const SUMMARY_FILE: &str = "summary.json";
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    /// Create `<root>/<label>/` if needed.
    pub fn new(root: &Path, label: &str) -> Result<Self> {
        let dir = root.join(label);
        fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names owned by the sink itself: the summary and in-flight temp files.
    pub fn is_reserved_name(name: &str) -> bool {
        name == SUMMARY_FILE || name.ends_with(TEMP_SUFFIX)
    }

    /// Final path for `name`. Rejects names that would leave the sink dir
    /// or clash with the summary or a temp file.
    pub fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        if Self::is_reserved_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output file name {:?} is reserved", name),
            ));
        }
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid output file name {:?}", name),
            ));
        }
        Ok(self.dir.join(name))
    }

    /// Write `data` as `name`, replacing any previous file. Returns bytes written.
    pub fn write_file(&self, name: &str, data: &[u8]) -> io::Result<u64> {
        let final_path = self.path_for(name)?;
        let temp_path = self.dir.join(format!("{}{}", name, TEMP_SUFFIX));
        let result = (|| {
            let mut f = File::create(&temp_path)?;
            f.write_all(data)?;
            f.sync_all()?;
            drop(f);
            fs::rename(&temp_path, &final_path)
        })();
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(data.len() as u64)
    }

    /// Write the run summary as pretty JSON to `<dir>/summary.json`.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(summary).context("serialize summary")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

use std::io;
use std::path::PathBuf;

/// Where a finished report ends up.
pub trait ArtifactSink: Send + Sync {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes reports into a directory, creating it when missing.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ArtifactSink for FileSink {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_name);
        std::fs::write(&path, bytes)?;
        tracing::info!("Report written to {}", path.display());
        Ok(())
    }
}

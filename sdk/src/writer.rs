use dart_data_class_compiler::DataClassError;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Writes generated Dart files into one directory.
#[derive(Debug, Clone)]
pub struct FsWriter {
    dir: PathBuf,
}

impl FsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `<name>.dart`, or `<name>_1.dart`, `<name>_2.dart`, ... if
    /// taken. The directory is created when missing.
    pub fn write(&self, content: &str, name: &str) -> Result<PathBuf, DataClassError> {
        let mut path = self.dir.join(format!("{}.dart", name));
        let mut suffix = 0;
        while path.exists() {
            suffix += 1;
            path = self.dir.join(format!("{}_{}.dart", name, suffix));
        }

        fs::create_dir_all(&self.dir).map_err(|source| DataClassError::WriteFailed {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| DataClassError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "wrote file");
        Ok(path)
    }
}

use std::{
    error::Error,
    fmt::Display,
    fs::{File, OpenOptions},
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access {
    Read,
    Write,
}

/// A file that could not be opened for reading or created for writing.
#[derive(Debug)]
pub struct ResourceError {
    path: PathBuf,
    access: Access,
    source: io::Error,
}

impl ResourceError {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self.access {
            Access::Read => "read",
            Access::Write => "write",
        };
        write!(
            f,
            "could not open {} for {}: {}",
            self.path.to_string_lossy(),
            action,
            self.source,
        )
    }
}

impl Error for ResourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

pub fn open_reader(path: &Path) -> Result<BufReader<File>, ResourceError> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| ResourceError {
            path: path.to_path_buf(),
            access: Access::Read,
            source,
        })?;
    Ok(BufReader::new(file))
}

pub fn create_writer(path: &Path) -> Result<BufWriter<File>, ResourceError> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| ResourceError {
            path: path.to_path_buf(),
            access: Access::Write,
            source,
        })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn test_open_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = open_reader(&path).err().unwrap();

        assert_eq!(err.access(), Access::Read);
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().starts_with("could not open"));
    }

    #[test]
    fn test_create_writer_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.vtk");

        let err = create_writer(&path).err().unwrap();

        assert_eq!(err.access(), Access::Write);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");

        let mut writer = create_writer(&path).unwrap();
        writer.write_all(b"hello").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut contents = String::new();
        open_reader(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");
    }
}

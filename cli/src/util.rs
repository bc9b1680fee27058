use std::{
    error::Error, fmt::Display, io::BufRead, path::Path
};

use anyhow::Result;
use clap::ValueEnum;
use pca_stats::util::open_reader;

pub fn get_buff_reader(filename: &Path) -> Result<Box<dyn BufRead>> {
    let reader = open_reader(filename)?;
    Ok(Box::new(reader))
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq)]
pub enum DataType {
    /// JSON array of iris records
    Json,
    /// Comma separated values
    Csv,
}

impl DataType {
    pub fn from_filename(filename: &Path) -> Result<Self, DataTypeError> {
        let dt = filename.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| DataType::from_str(e, true).ok());

        match dt {
            Some(dt) => Ok(dt),
            None => Err(DataTypeError::CouldNotGetFromFileExt(
                filename.to_string_lossy().to_string())),
        }
    }
}

#[derive(Debug)]
pub enum DataTypeError {
    CouldNotGetFromFileExt(String),
}

impl Display for DataTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataTypeError::CouldNotGetFromFileExt(file) => {
                write!(f, "File extension couldn't be identified on {}, --datatype must be provided", file)
            }
        }
    }
}

impl Error for DataTypeError {}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_data_type_from_filename() {
        assert_eq!(DataType::from_filename(&PathBuf::from("iris.json")).unwrap(), DataType::Json);
        assert_eq!(DataType::from_filename(&PathBuf::from("data/iris.CSV")).unwrap(), DataType::Csv);
    }

    #[test]
    fn test_data_type_unknown_extension() {
        assert!(DataType::from_filename(&PathBuf::from("iris.txt")).is_err());
        assert!(DataType::from_filename(&PathBuf::from("iris")).is_err());
    }

    #[test]
    fn test_get_buff_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = get_buff_reader(&dir.path().join("missing.json"));

        let err = result.err().unwrap();
        assert!(err.downcast_ref::<pca_stats::util::ResourceError>().is_some());
    }
}

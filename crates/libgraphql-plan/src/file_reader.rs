use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, ReadContentError>;

/// Read a GraphQL source file (schema or executable document) into memory.
pub(crate) fn read_content<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let file_path = file_path.as_ref();
    if !file_path.is_file() {
        return Err(ReadContentError::PathIsNotAFile(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)
        .map_err(|err| ReadContentError::FileReadError {
            file_path: file_path.to_path_buf(),
            err,
        })?;

    String::from_utf8(bytes)
        .map_err(|err| ReadContentError::FileDecodeError {
            file_path: file_path.to_path_buf(),
            err,
        })
}

#[derive(Debug, Error)]
pub enum ReadContentError {
    #[error("File at {file_path:?} is not valid utf-8: {err}")]
    FileDecodeError {
        file_path: PathBuf,
        err: std::string::FromUtf8Error,
    },

    #[error("Failed to read file at {file_path:?}: {err}")]
    FileReadError {
        file_path: PathBuf,
        err: std::io::Error,
    },

    #[error("Path {0:?} does not point to a file")]
    PathIsNotAFile(PathBuf),
}
impl std::cmp::PartialEq for ReadContentError {
    fn eq(&self, other: &Self) -> bool {
        use ReadContentError::*;
        match (self, other) {
            (
                FileDecodeError { file_path: lhs_path, err: lhs_err },
                FileDecodeError { file_path: rhs_path, err: rhs_err },
            ) => lhs_path == rhs_path && lhs_err == rhs_err,

            (
                FileReadError { file_path: lhs_path, err: lhs_err },
                FileReadError { file_path: rhs_path, err: rhs_err },
            ) => lhs_path == rhs_path && lhs_err.kind() == rhs_err.kind(),

            (PathIsNotAFile(lhs_path), PathIsNotAFile(rhs_path)) =>
                lhs_path == rhs_path,

            _ => false,
        }
    }
}

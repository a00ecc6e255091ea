use crate::ingest::SharedRecord;
use std::{
    fmt, io,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to read the dataset from '{path}'. {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("The dataset from '{0}' is empty")]
    Empty(String),
}

/// Where the raw TLE text comes from
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DatasetSource {
    File(PathBuf),
    Stdin,
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(p) => write!(f, "{}", p.display()),
            DatasetSource::Stdin => f.write_str("<stdin>"),
        }
    }
}

impl FromStr for DatasetSource {
    type Err = std::convert::Infallible;

    /// `-` means stdin, anything else is a path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "-" {
            DatasetSource::Stdin
        } else {
            DatasetSource::File(PathBuf::from(s))
        })
    }
}

impl DatasetSource {
    pub fn file<P: AsRef<Path>>(p: P) -> Self {
        DatasetSource::File(p.as_ref().to_path_buf())
    }

    pub fn fetch(&self) -> Result<String, FetchError> {
        let io_err = |source| FetchError::Io {
            path: self.to_string(),
            source,
        };
        let text = match self {
            DatasetSource::File(p) => std::fs::read_to_string(p).map_err(io_err)?,
            DatasetSource::Stdin => {
                let mut s = String::new();
                io::stdin().read_to_string(&mut s).map_err(io_err)?;
                s
            }
        };
        if text.trim().is_empty() {
            return Err(FetchError::Empty(self.to_string()));
        }
        Ok(text)
    }
}

/// The view's copy of the dataset
#[derive(Debug)]
pub enum DatasetState<S> {
    /// Nothing delivered yet
    Pending,
    Loaded(Vec<SharedRecord<S>>),
    /// The fetch failed, the view carries on empty
    Failed(String),
}

impl<S> Default for DatasetState<S> {
    fn default() -> Self {
        DatasetState::Pending
    }
}

impl<S> DatasetState<S> {
    pub fn records(&self) -> &[SharedRecord<S>] {
        match self {
            DatasetState::Loaded(r) => r,
            DatasetState::Pending | DatasetState::Failed(_) => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DatasetState::Pending)
    }
}

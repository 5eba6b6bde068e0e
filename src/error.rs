use std::path::PathBuf;

/// Broad classes of failure, each with its own process exit status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected failure while reading a file that does exist.
    Internal,
    /// Something the user can fix on the command line.
    Argument,
    /// The file is fine but carries no version resource.
    NoVersionInfo,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::Argument => 2,
            ErrorKind::NoVersionInfo => 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("executable not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no version info in {}", .0.display())]
    NoVersionInfo(PathBuf),

    #[error("invalid version field {0:?}, expected one of major, minor, patch, build")]
    InvalidField(String),

    #[error("{}: {source:#}", .path.display())]
    Internal {
        path: PathBuf,
        source: anyhow::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) | Error::InvalidField(_) => ErrorKind::Argument,
            Error::NoVersionInfo(_) => ErrorKind::NoVersionInfo,
            Error::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn exit_codes() {
        assert_eq!(Error::NotFound("x.exe".into()).exit_code(), 2);
        assert_eq!(Error::InvalidField("bogus".into()).exit_code(), 2);
        assert_eq!(Error::NoVersionInfo("x.exe".into()).exit_code(), 3);
        let internal = Error::Internal {
            path: "x.exe".into(),
            source: anyhow!("boom"),
        };
        assert_eq!(internal.exit_code(), 1);
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::NotFound("a/b.exe".into()).to_string(),
            "executable not found: a/b.exe"
        );
        assert!(Error::InvalidField("bogus".into())
            .to_string()
            .starts_with("invalid version field \"bogus\""));
        let internal = Error::Internal {
            path: "x.exe".into(),
            source: anyhow!("inner").context("outer"),
        };
        assert_eq!(internal.to_string(), "x.exe: outer: inner");
    }
}

//! Read the version number out of a Windows executable's version resource and print it in a
//! caller-chosen format.
//!
//! ```no_run
//! let packed = filever::resolve("C:\\Windows\\notepad.exe")?;
//! println!("{}", filever::render(packed, "major.minor")?);
//! # Ok::<(), filever::Error>(())
//! ```

use std::path::Path;

use tracing::{debug, info};

mod error;
mod fixed_info;
mod version;

#[cfg(not(windows))]
mod pe;
#[cfg(windows)]
mod win;

#[cfg(not(windows))]
use crate::pe as platform;
#[cfg(windows)]
use crate::win as platform;

pub use crate::error::{Error, ErrorKind};
pub use crate::fixed_info::FixedFileInfo;
pub use crate::version::{render, Field, Format, Version};

/// Get the root-level fixed info for a file.
///
/// The path is checked for existence before anything else, so a missing file is always
/// [`Error::NotFound`]. A file that exists but has no usable version resource is
/// [`Error::NoVersionInfo`].
pub fn resolve_fixed_info<P>(path: P) -> Result<FixedFileInfo, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Err(e) = path.metadata() {
        debug!(path = %path.display(), "stat failed: {}", e);
        return Err(Error::NotFound(path.to_owned()));
    }

    match platform::read_fixed_info(path) {
        Ok(Some(info)) => {
            debug!(path = %path.display(), ?info, "read fixed file info");
            Ok(info)
        }
        Ok(None) => {
            info!(path = %path.display(), "no version info");
            Err(Error::NoVersionInfo(path.to_owned()))
        }
        Err(source) => Err(Error::Internal {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Get the packed 64-bit file version of an executable.
pub fn resolve<P>(path: P) -> Result<u64, Error>
where
    P: AsRef<Path>,
{
    resolve_fixed_info(path).map(|info| info.file_version)
}

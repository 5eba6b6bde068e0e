//! Version resource lookup for hosts without the Win32 version API.
//!
//! The file is mapped and parsed as a PE image, and the version resource is looked up through the
//! image's resource directory. Its fixed info is the root block `VerQueryValueW("\\")` returns on
//! Windows.

use std::fs;
use std::mem::size_of_val;
use std::path::Path;
use std::slice;

use anyhow::{anyhow, Context, Result};
use pelite::resources::Resources;
use pelite::{pe32, pe64, FileMap};
use tracing::debug;

use crate::fixed_info::{FixedFileInfo, RawFixedFileInfo};

/// Resource directory of a PE32+ or PE32 image.
fn resources(image: &[u8]) -> pelite::Result<Resources<'_>> {
    use pelite::pe32::Pe as _;
    use pelite::pe64::Pe as _;

    match pe64::PeFile::from_bytes(image) {
        Ok(file) => file.resources(),
        Err(_) => pe32::PeFile::from_bytes(image)?.resources(),
    }
}

fn get_fixed_info(image: &[u8]) -> Result<FixedFileInfo> {
    let resources = resources(image).map_err(|e| anyhow!("not a PE image: {:?}", e))?;
    let version_info = resources
        .version_info()
        .map_err(|e| anyhow!("no version resource: {:?}", e))?;
    let fixed = version_info
        .fixed()
        .context("version resource has no VS_FIXEDFILEINFO")?;

    // Safety: VS_FIXEDFILEINFO is plain old data borrowed from `image`
    let bytes =
        unsafe { slice::from_raw_parts(fixed as *const _ as *const u8, size_of_val(fixed)) };
    let raw = RawFixedFileInfo::from_le_bytes(bytes)?;
    raw.check_signature()?;
    Ok(FixedFileInfo::from(raw))
}

/// Fixed info of a PE image held in memory. None if `image` isn't a PE image or has no version
/// resource.
pub(crate) fn find_fixed_info(image: &[u8]) -> Option<FixedFileInfo> {
    match get_fixed_info(image) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!("{:#}", e);
            None
        }
    }
}

/// Get the root-level fixed info for a file.
///
/// Ok(None) for anything that isn't a regular PE file carrying a version resource.
pub(crate) fn read_fixed_info(path: &Path) -> Result<Option<FixedFileInfo>> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if !meta.is_file() || meta.len() == 0 {
        debug!("not a regular non-empty file");
        return Ok(None);
    }

    let map = FileMap::open(path).with_context(|| format!("map {}", path.display()))?;
    Ok(find_fixed_info(map.as_ref()))
}

//! Version resource lookup through the Win32 version API.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use anyhow::{anyhow, Result};
use tracing::debug;
use winapi::ctypes::c_void;
use winapi::shared::minwindef::{DWORD, UINT};
use winapi::um::winver::{GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW};

use crate::fixed_info::{FixedFileInfo, RawFixedFileInfo};

/// convert an OsStr (which is encoded as UTF-8 like "WTF-8") into a null-terminated Win32 Wide
/// String, a pointer to which can serve as a LPCWSTR.
/// Fails if there is an inner null in the source, which is illegal.
fn to_wide_string<S>(s: &S) -> Result<Vec<u16>>
where
    S: AsRef<OsStr> + ?Sized,
{
    let mut v: Vec<u16> = s.as_ref().encode_wide().collect();
    if let Some(i) = v.iter().position(|&c| c == 0) {
        return Err(anyhow!("inner nullbyte at position {}", i));
    }
    v.push(0);
    Ok(v)
}

/// Call GetFileVersionInfoW and return the raw data buffer as a boxed slice.
/// None when the file has no version resource or it could not be loaded.
fn get_version_data(path_w: &[u16]) -> Option<Box<[u8]>> {
    let mut handle: DWORD = 0;
    // DWORD GetFileVersionInfoSizeW(LPCWSTR lptstrFilename, LPDWORD lpdwHandle);
    let size = unsafe { GetFileVersionInfoSizeW(path_w.as_ptr(), &mut handle) };
    if size == 0 {
        debug!("GetFileVersionInfoSizeW returned 0");
        return None;
    }

    let mut buf = vec![0u8; size as usize];
    // BOOL GetFileVersionInfoW(LPCWSTR lptstrFilename, DWORD dwHandle, DWORD dwLen, LPVOID lpData);
    // dwhandle is ignored.
    // Safety: lpData must be valid for dwLen bytes
    let ret = unsafe { GetFileVersionInfoW(path_w.as_ptr(), 0, size, buf.as_mut_ptr() as *mut _) };
    match ret {
        0 => {
            debug!(size, "GetFileVersionInfoW failed");
            None
        }
        _ => Some(buf.into_boxed_slice()),
    }
}

/// Call VerQueryValueW to vet the root-block FixedFileInfo data.
///
/// Safety: vdata must contain data that was returned successfully from GetFileVersionInfoW.
/// A pointer to vdata will be passed to VerQueryValue with no size checking.
unsafe fn get_fixed_info(vdata: &[u8]) -> Result<FixedFileInfo> {
    let mut pinfo: *mut c_void = ptr::null_mut();
    let mut pinfo_size: UINT = 0;
    let block = to_wide_string("\\")?;

    // BOOL VerQueryValue(LPCVOID pBlock, LPCWSTR lpSubBlock, LPVOID *lplpBuffer, PUINT puLen);
    // lpSubBlock is the block to read. \ is the root block
    //
    // Safety: pinfo points somewhere inside vdata, don't let it outlive this function
    let ret = VerQueryValueW(
        vdata.as_ptr() as *const _,
        block.as_ptr(),
        &mut pinfo,
        &mut pinfo_size,
    );

    if ret == 0 {
        return Err(anyhow!("VerQueryValueW failed"));
    }
    if pinfo.is_null() {
        return Err(anyhow!("Got null result from VerQueryValueW"));
    }
    if (pinfo_size as usize) < RawFixedFileInfo::SIZE {
        return Err(anyhow!(
            "Not enough RawFixedFileInfo data. Expected {} got {}",
            RawFixedFileInfo::SIZE,
            pinfo_size
        ));
    }

    // the raw block isn't guaranteed to be aligned
    let raw_info = ptr::read_unaligned(pinfo as *const RawFixedFileInfo);
    raw_info.check_signature()?;

    Ok(FixedFileInfo::from(raw_info))
}

/// Get the root-level fixed info for a file.
///
/// Every failure of the version API itself means "no version info" and yields Ok(None).
/// Err is reserved for paths that can't be handed to the API.
pub(crate) fn read_fixed_info(path: &Path) -> Result<Option<FixedFileInfo>> {
    let path_w = to_wide_string(path.as_os_str())?;
    let data = match get_version_data(&path_w) {
        Some(data) => data,
        None => return Ok(None),
    };

    match unsafe { get_fixed_info(&data) } {
        Ok(info) => Ok(Some(info)),
        Err(e) => {
            debug!("{:#}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_string_is_null_terminated() {
        let w = to_wide_string("ab").unwrap();
        assert_eq!(w, vec![b'a' as u16, b'b' as u16, 0]);
    }

    #[test]
    fn inner_null_is_rejected() {
        assert!(to_wide_string("a\0b").is_err());
    }

    #[test]
    fn text_file_has_no_version_info() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"just some text\r\n").unwrap();
        assert_eq!(read_fixed_info(file.path()).unwrap(), None);
    }
}

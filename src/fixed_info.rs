use std::mem::size_of;

use anyhow::{anyhow, ensure, Result};

/// Value of `dwSignature` in every valid VS_FIXEDFILEINFO.
pub(crate) const FIXED_INFO_SIGNATURE: u32 = 0xfeef04bd;

/// VS_FIXEDFILEINFO, C version
#[repr(C)]
#[allow(non_snake_case)]
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct RawFixedFileInfo {
    pub dwSignature: u32,
    pub dwStrucVersion: u32,
    pub dwFileVersionMS: u32,
    pub dwFileVersionLS: u32,
    pub dwProductVersionMS: u32,
    pub dwProductVersionLS: u32,
    pub dwFileFlagsMask: u32,
    pub dwFileFlags: u32,
    pub dwFileOS: u32,
    pub dwFileType: u32,
    pub dwFileSubtype: u32,
    pub dwFileDateMS: u32,
    pub dwFileDateLS: u32,
}

impl RawFixedFileInfo {
    pub const SIZE: usize = size_of::<RawFixedFileInfo>();

    /// Decode from the little-endian on-disk layout. `data` may be longer than the structure.
    #[cfg_attr(windows, allow(dead_code))]
    pub fn from_le_bytes(data: &[u8]) -> Result<Self> {
        ensure!(
            data.len() >= Self::SIZE,
            "Not enough RawFixedFileInfo data. Expected {} got {}",
            Self::SIZE,
            data.len()
        );
        let mut words = data[..Self::SIZE]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        let mut next = || words.next().unwrap_or_default();

        Ok(Self {
            dwSignature: next(),
            dwStrucVersion: next(),
            dwFileVersionMS: next(),
            dwFileVersionLS: next(),
            dwProductVersionMS: next(),
            dwProductVersionLS: next(),
            dwFileFlagsMask: next(),
            dwFileFlags: next(),
            dwFileOS: next(),
            dwFileType: next(),
            dwFileSubtype: next(),
            dwFileDateMS: next(),
            dwFileDateLS: next(),
        })
    }

    /// Reject blocks whose signature isn't the VS_FIXEDFILEINFO magic number.
    pub fn check_signature(&self) -> Result<()> {
        if self.dwSignature != FIXED_INFO_SIGNATURE {
            return Err(anyhow!(
                "Unexpected VS_FIXEDFILEINFO signature {:x}",
                self.dwSignature
            ));
        }
        Ok(())
    }
}

/// A Rust representation of [VS_FIXEDFILEINFO].
///
/// [VS_FIXEDFILEINFO] https://docs.microsoft.com/en-us/windows/win32/api/verrsrc/ns-verrsrc-vs_fixedfileinfo
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedFileInfo {
    /// The binary version number of this structure
    pub struc_version: u32,
    /// The file's binary version number. Combined dwFileVersionMS and dwFileVersionLS
    pub file_version: u64,
    /// The product's binary version number. Combined dwProductVersionMS and dwProductVersionLS
    pub product_version: u64,
    /// Bitmask of valid bits in file_flags
    pub file_flags_mask: u32,
    /// File flags
    pub file_flags: u32,
    /// The operating system for which this file was designed
    pub file_os: u32,
    /// The general type of the file.
    pub file_type: u32,
    /// The function of the file. The possible values depend on the value of file_type.
    pub file_subtype: u32,
    /// The binary creation create date & time stamp. Combined dwFileDateMS and dwFileDateLS
    pub file_date: u64,
}

impl From<RawFixedFileInfo> for FixedFileInfo {
    #[rustfmt::skip]
    fn from(r: RawFixedFileInfo) -> Self {
        #[inline]
        fn combine_dwords(high: u32, low: u32) -> u64 {
            ((high as u64) << 32) | (low as u64)
        }

        Self {
            struc_version:   r.dwStrucVersion,
            file_version:    combine_dwords(r.dwFileVersionMS, r.dwFileVersionLS),
            product_version: combine_dwords(r.dwProductVersionMS, r.dwProductVersionLS),
            file_flags_mask: r.dwFileFlagsMask,
            file_flags:      r.dwFileFlags,
            file_os:         r.dwFileOS,
            file_type:       r.dwFileType,
            file_subtype:    r.dwFileSubtype,
            file_date:       combine_dwords(r.dwFileDateMS, r.dwFileDateLS),
        }
    }
}

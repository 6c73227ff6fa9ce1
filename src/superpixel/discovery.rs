use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ExportError;

/// Extension every superpixel image must carry.
const PNG_EXTENSION: &str = ".png";

/// A superpixel image file and the Z slice parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceFile {
    pub z: u32,
    pub path: PathBuf,
}

/// Result of walking a superpixel image directory.
#[derive(Debug, Clone, Default)]
pub struct SliceListing {
    /// In-range slices in ascending Z order
    pub slices: Vec<SliceFile>,

    /// PNG files whose Z fell outside the requested range
    pub skipped_out_of_range: usize,

    /// Files ignored for not being PNGs
    pub skipped_non_png: usize,
}

/// Parse the decimal Z index that immediately precedes `.png` in a file name.
///
/// `sp_map.00042.png` yields 42. Names without digits before the extension,
/// or whose index overflows `u32`, are rejected.
pub fn parse_slice_z(path: &Path) -> Result<u32, ExportError> {
    let parse_error = || ExportError::FilenameParse {
        path: path.display().to_string(),
    };

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(parse_error)?;
    let stem = name.strip_suffix(PNG_EXTENSION).ok_or_else(parse_error)?;
    let digits_start = stem
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let digits = &stem[digits_start..];
    if digits.is_empty() {
        return Err(parse_error());
    }
    digits.parse().map_err(|_| parse_error())
}

/// Walk `dir` recursively and list the PNG slices with `min_z <= z <= max_z`.
pub fn discover_slices(dir: &Path, min_z: u32, max_z: u32) -> Result<SliceListing, ExportError> {
    let mut listing = SliceListing::default();
    walk(dir, min_z, max_z, &mut listing)?;

    listing.slices.sort_by_key(|slice| slice.z);
    if let Some(pair) = listing.slices.windows(2).find(|w| w[0].z == w[1].z) {
        return Err(ExportError::DuplicateSlice {
            z: pair[0].z,
            first: pair[0].path.display().to_string(),
            second: pair[1].path.display().to_string(),
        });
    }
    Ok(listing)
}

fn walk(dir: &Path, min_z: u32, max_z: u32, listing: &mut SliceListing) -> Result<(), ExportError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| ExportError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ExportError::io(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, min_z, max_z, listing)?;
            continue;
        }
        let is_png = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(PNG_EXTENSION));
        if !is_png {
            debug!(path = %path.display(), "Skipping non-PNG file");
            listing.skipped_non_png += 1;
            continue;
        }

        let z = parse_slice_z(&path)?;
        if z < min_z || z > max_z {
            debug!(path = %path.display(), z, "Skipping slice outside Z range");
            listing.skipped_out_of_range += 1;
            continue;
        }
        listing.slices.push(SliceFile { z, path });
    }
    Ok(())
}

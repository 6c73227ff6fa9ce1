use thiserror::Error;

/// Errors raised while loading the segment->body and superpixel->segment maps
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// The map file could not be opened or read
    #[error("I/O error reading {source_name}: {message}")]
    Io {
        source_name: String,
        message: String,
    },

    /// A non-comment line did not hold the expected unsigned integers
    #[error("Malformed record at line {line} in {source_name}")]
    MalformedRecord { source_name: String, line: usize },

    /// Superpixel id does not fit in the 24-bit RGB-encoded id space
    #[error("Superpixel id {superpixel} at line {line} in {source_name} exceeds 24-bit value")]
    SuperpixelRange {
        source_name: String,
        line: usize,
        superpixel: u64,
    },

    /// A superpixel references a segment absent from the segment->body map
    #[error(
        "Segment ({segment}) for slice {slice} in {superpixel_source} not found in {segment_source}"
    )]
    UnresolvedSegment {
        segment: u64,
        slice: u32,
        superpixel_source: String,
        segment_source: String,
    },
}

/// Errors related to loading a region of interest
#[derive(Debug, Clone, Error)]
pub enum RoiError {
    /// The ROI file could not be read
    #[error("I/O error reading ROI {source_name}: {message}")]
    Io {
        source_name: String,
        message: String,
    },

    /// The ROI file is not a JSON array of [z, y, x0, x1] spans
    #[error("Could not parse ROI {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Span whose x0 lies past its x1
    #[error("ROI span {index} has x0 ({x0}) > x1 ({x1})")]
    InvalidSpan { index: usize, x0: i32, x1: i32 },

    /// Span sorts before its predecessor in (z, y, x0) order
    #[error("ROI span {index} is not in ascending (z, y, x0) order")]
    Unsorted { index: usize },

    /// Span overlaps its predecessor on the same (z, y) row
    #[error("ROI span {index} overlaps the previous span on the same row")]
    Overlap { index: usize },
}

/// Errors raised while turning superpixel image pixels into labels
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Pixel sample does not match the format declared for its image
    #[error("Expected {expected} superpixels, got {got} pixel")]
    UnsupportedColorModel {
        expected: &'static str,
        got: &'static str,
    },

    /// Format tag that no decoder exists for
    #[error("Unknown superpixel format: {0}")]
    UnknownSuperpixelFormat(String),

    /// Image pixel type is neither 16-bit gray nor 8-bit RGBA
    #[error("Unable to decode superpixel image of type {kind}: {path}")]
    UnsupportedImageType { path: String, kind: String },

    /// The image file could not be opened or decoded as PNG
    #[error("Unable to read superpixel image {path}: {message}")]
    Image { path: String, message: String },
}

/// Errors from slab compression
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Compression name not among none / lz4 / gzip
    #[error("Unknown compression type {0:?} (expected none, lz4 or gzip)")]
    UnknownCompressionMode(String),

    /// Compressor failed
    #[error("{codec} compression failed: {message}")]
    Compress {
        codec: &'static str,
        message: String,
    },

    /// Decompressor failed or produced an unexpected length
    #[error("{codec} decompression failed: {message}")]
    Decompress {
        codec: &'static str,
        message: String,
    },
}

/// Errors from delivering a slab to its destination
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// Local file system failure
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// The remote store could not be reached
    #[error("Connection error posting to {url}: {message}")]
    Connection { url: String, message: String },

    /// The remote store answered with a non-retryable status
    #[error("Remote store returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Endpoint URL could not be parsed
    #[error("Invalid remote URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Top-level error for an export run. Every variant is fatal.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("Lookup table error: {0}")]
    Table(#[from] TableError),

    #[error("ROI error: {0}")]
    Roi(#[from] RoiError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Delivery error: {0}")]
    Sink(#[from] SinkError),

    /// Export settings that cannot produce a volume
    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),

    /// File name lacks a decimal Z index right before `.png`
    #[error("Error parsing Z slice in filename {path:?}")]
    FilenameParse { path: String },

    /// Two image files resolve to the same Z
    #[error("Slice {z} appears twice: {first} and {second}")]
    DuplicateSlice {
        z: u32,
        first: String,
        second: String,
    },

    /// Image size differs from the first image of the run
    #[error(
        "Superpixel image changes sizes: expected {expected_x} x {expected_y} and got {got_x} x {got_y}: {path}"
    )]
    DimensionMismatch {
        expected_x: u32,
        expected_y: u32,
        got_x: u32,
        got_y: u32,
        path: String,
    },

    /// Label with no body while strict lookups are enabled
    #[error("Could not find superpixel ({slice}, {label}) in mapping files")]
    UnresolvedSuperpixel { slice: u32, label: u32 },

    /// Body id plus the configured offset does not fit in 64 bits
    #[error("Body {body} of superpixel ({slice}, {label}) overflows with offset {offset}")]
    BodyOverflow {
        slice: u32,
        label: u32,
        body: u64,
        offset: u64,
    },

    /// Directory traversal or other file system failure
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },
}

impl ExportError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        ExportError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

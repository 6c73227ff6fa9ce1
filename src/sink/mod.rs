//! Slab destinations.
//!
//! A [`SlabSink`] delivers one compressed [`Slab`](crate::slab::Slab). The
//! exporter writes to a local directory ([`FileSink`]), a remote volume
//! store ([`HttpSink`]), or both.

mod file;
mod http;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::slab::Slab;

pub use file::{slab_file_name, FileSink};
pub use http::{slab_url, HttpSink, RetryPolicy};

/// Destination for compressed slabs.
#[async_trait]
pub trait SlabSink: Send + Sync {
    /// Deliver `slab`. Returns only once it is stored or has failed for good.
    async fn put(&self, slab: &Slab) -> Result<(), SinkError>;

    /// Where slabs go, for logging.
    fn identifier(&self) -> &str;
}

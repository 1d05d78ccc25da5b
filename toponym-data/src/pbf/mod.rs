//! OSM PBF decoding as a [`ChunkSource`].
//!
//! Every `OSMData` blob of the file becomes one chunk. Header blobs carry no
//! entities and are skipped. The total chunk count is established up front by
//! a cheap pass that reads blob headers without decompressing them.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use osmpbf::{BlobDecode, BlobReader, BlobType};
use thiserror::Error;
use toponym_core::{ChunkError, ChunkSource, RawEntity};

mod convert;

/// Errors raised while reading an OSM PBF file.
#[derive(Debug, Error)]
pub enum PbfError {
    /// The file could not be opened.
    #[error("failed to open OSM PBF file at {path:?}")]
    Open {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// Path of the file.
        path: PathBuf,
    },
    /// A blob could not be read or decoded.
    #[error("failed to decode OSM PBF data at {path:?}")]
    Decode {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// Path of the file.
        path: PathBuf,
    },
}

/// Streams the data blocks of an OSM PBF file.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
/// use toponym_core::ChunkSource;
/// use toponym_data::PbfChunkSource;
///
/// # fn main() -> Result<(), toponym_data::PbfError> {
/// let mut source = PbfChunkSource::open(Path::new("france.osm.pbf"))?;
/// println!("{:?} chunks", source.total_chunks());
/// while let Some(chunk) = source.next_chunk() {
///     let _entities = chunk.map_err(|err| err.to_string());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PbfChunkSource {
    path: PathBuf,
    blobs: BlobReader<BufReader<File>>,
    total: usize,
}

impl std::fmt::Debug for PbfChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PbfChunkSource")
            .field("path", &self.path)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl PbfChunkSource {
    /// Open `path` and count its data blobs.
    ///
    /// # Errors
    /// Returns [`PbfError::Open`] if the file cannot be opened and
    /// [`PbfError::Decode`] if a blob header is malformed.
    pub fn open(path: &Path) -> Result<Self, PbfError> {
        let total = count_data_blobs(path)?;
        debug!("{} holds {total} data blobs", path.display());
        let blobs = open_reader(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            blobs,
            total,
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode_error(&self, source: osmpbf::Error) -> ChunkError {
        Box::new(PbfError::Decode {
            source,
            path: self.path.clone(),
        })
    }
}

impl ChunkSource for PbfChunkSource {
    fn total_chunks(&self) -> Option<usize> {
        Some(self.total)
    }

    fn next_chunk(&mut self) -> Option<Result<Vec<RawEntity>, ChunkError>> {
        loop {
            let blob = match self.blobs.next()? {
                Ok(blob) => blob,
                Err(source) => return Some(Err(self.decode_error(source))),
            };
            match blob.decode() {
                Ok(BlobDecode::OsmData(block)) => return Some(Ok(convert::block_entities(&block))),
                Ok(BlobDecode::OsmHeader(_) | BlobDecode::Unknown(_)) => {}
                Err(source) => return Some(Err(self.decode_error(source))),
            }
        }
    }
}

fn open_reader(path: &Path) -> Result<BlobReader<BufReader<File>>, PbfError> {
    BlobReader::from_path(path).map_err(|source| PbfError::Open {
        source,
        path: path.to_path_buf(),
    })
}

fn count_data_blobs(path: &Path) -> Result<usize, PbfError> {
    open_reader(path)?.try_fold(0_usize, |count, blob| {
        let blob = blob.map_err(|source| PbfError::Decode {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(count + usize::from(matches!(blob.get_type(), BlobType::OsmData)))
    })
}

//! Compressed content buffers for file nodes

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fmt;
use std::io::{Read, Write};

/// Immutable zlib-compressed file content.
///
/// Blobs are shared between revisions through `Arc<Blob>`; nothing mutates a
/// blob after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    compressed: Vec<u8>,
}

impl Blob {
    /// Compress raw bytes at the best compression level.
    pub fn compress(raw: &[u8]) -> std::io::Result<Self> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(raw)?;
        Ok(Blob {
            compressed: encoder.finish()?,
        })
    }

    /// Wrap bytes that are already compressed, e.g. when decoding a repository file.
    pub fn from_compressed(compressed: Vec<u8>) -> Self {
        Blob { compressed }
    }

    pub fn decompress(&self) -> std::io::Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(self.compressed.as_slice());
        let mut raw = Vec::new();
        decoder.read_to_end(&mut raw)?;
        Ok(raw)
    }

    /// Decode the whole stream without keeping the output.
    pub fn verify(&self) -> std::io::Result<()> {
        let mut decoder = ZlibDecoder::new(self.compressed.as_slice());
        std::io::copy(&mut decoder, &mut std::io::sink())?;
        Ok(())
    }

    pub fn compressed(&self) -> &[u8] {
        &self.compressed
    }

    pub fn stored_len(&self) -> usize {
        self.compressed.len()
    }

    /// True when both blobs decompress to the same bytes.
    ///
    /// Identical compressed bytes short-circuit; undecodable content never compares equal.
    pub fn same_content(&self, other: &Blob) -> bool {
        if self.compressed == other.compressed {
            return true;
        }
        match (self.decompress(), other.decompress()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("stored_len", &self.compressed.len())
            .finish()
    }
}

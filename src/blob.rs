//! Checksummed little-endian binary blobs used for dataset and model files.
//!
//! Layout: 8-byte magic, `u32` format version, payload, then the 32-byte
//! BLAKE3 digest of everything before it.

use thiserror::Error;

const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Reasons a blob is rejected while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("file is truncated")]
    Truncated,
    #[error("checksum mismatch")]
    ChecksumMismatch,
    #[error("unexpected file magic")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

/// Builder for a blob body; call [`BlobWriter::finish`] to append the digest.
pub struct BlobWriter {
    bytes: Vec<u8>,
}

impl BlobWriter {
    pub fn new(magic: &[u8; 8], version: u32, capacity: usize) -> Self {
        let mut bytes = Vec::with_capacity(12 + capacity + DIGEST_LEN);
        bytes.extend_from_slice(magic);
        bytes.extend_from_slice(&version.to_le_bytes());
        Self { bytes }
    }

    pub fn u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn f32s(&mut self, values: &[f32]) {
        for &v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// Append the digest and return the finished blob.
    pub fn finish(mut self) -> Vec<u8> {
        let digest = blake3::hash(&self.bytes);
        self.bytes.extend_from_slice(digest.as_bytes());
        self.bytes
    }
}

/// Cursor over a verified blob body.
pub struct BlobReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BlobReader<'a> {
    /// Verify the digest, magic and version, returning a reader positioned after the header.
    pub fn open(bytes: &'a [u8], magic: &[u8; 8], version: u32) -> Result<Self, BlobError> {
        if bytes.len() < magic.len() + 4 + DIGEST_LEN {
            return Err(BlobError::Truncated);
        }
        let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
        if blake3::hash(body).as_bytes() != digest {
            return Err(BlobError::ChecksumMismatch);
        }
        let mut reader = Self {
            bytes: body,
            pos: 0,
        };
        if reader.take(magic.len())? != magic {
            return Err(BlobError::BadMagic);
        }
        let found = reader.u32()?;
        if found != version {
            return Err(BlobError::UnsupportedVersion(found));
        }
        Ok(reader)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BlobError> {
        let end = self.pos.checked_add(len).ok_or(BlobError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(BlobError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn u8(&mut self) -> Result<u8, BlobError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, BlobError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn u64(&mut self) -> Result<u64, BlobError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn f32(&mut self) -> Result<f32, BlobError> {
        let raw = self.take(4)?;
        Ok(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn f32s(&mut self, len: usize) -> Result<Vec<f32>, BlobError> {
        let raw = self.take(len.checked_mul(4).ok_or(BlobError::Truncated)?)?;
        Ok(raw
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Fail unless every payload byte was consumed.
    pub fn finish(self) -> Result<(), BlobError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(BlobError::TrailingBytes(extra)),
        }
    }
}

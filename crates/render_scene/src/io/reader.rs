//! Little-endian binary reader

use std::io::Read;

use super::{FormatError, DEFAULT_MAX_STRING_LENGTH};
use crate::foundation::math::{Quat, Quaternion, ScaledTransform, Vec3};

// Upper bound on speculative preallocation for length-prefixed arrays.
const MAX_PREALLOCATED_ELEMENTS: usize = 4096;

/// Reads scene records from any [`Read`] source
pub struct BinaryReader<R: Read> {
    inner: R,
    string_limit: u32,
}

impl<R: Read> BinaryReader<R> {
    /// Wrap a source with the default string limit
    pub fn new(inner: R) -> Self {
        Self::with_string_limit(inner, DEFAULT_MAX_STRING_LENGTH)
    }

    /// Wrap a source, rejecting strings longer than `string_limit` bytes
    pub fn with_string_limit(inner: R, string_limit: u32) -> Self {
        Self { inner, string_limit }
    }

    /// Unwrap the source
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` completely
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), FormatError> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        let mut buf = [0u8; 1];
        self.read_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `u64`
    pub fn read_u64(&mut self) -> Result<u64, FormatError> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a little-endian `f32`
    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Read a `u32` length prefix followed by UTF-8 bytes
    pub fn read_string(&mut self) -> Result<String, FormatError> {
        let length = self.read_u32()?;
        if length > self.string_limit {
            return Err(FormatError::StringTooLong {
                length: u64::from(length),
                limit: self.string_limit,
            });
        }

        let mut bytes = vec![0u8; length as usize];
        self.read_bytes(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8)
    }

    /// Read x, y, z
    pub fn read_vec3(&mut self) -> Result<Vec3, FormatError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Read i, j, k, w
    ///
    /// The quaternion is taken as stored, without renormalization, so the
    /// bits written are the bits read.
    pub fn read_quat(&mut self) -> Result<Quat, FormatError> {
        let i = self.read_f32()?;
        let j = self.read_f32()?;
        let k = self.read_f32()?;
        let w = self.read_f32()?;
        Ok(Quat::new_unchecked(Quaternion::new(w, i, j, k)))
    }

    /// Read origin, rotation, scale
    pub fn read_transform(&mut self) -> Result<ScaledTransform, FormatError> {
        let origin = self.read_vec3()?;
        let rotation = self.read_quat()?;
        let scale = self.read_vec3()?;
        Ok(ScaledTransform { origin, rotation, scale })
    }

    /// Read a trivially-copyable value from raw bytes
    pub fn read_pod<T: bytemuck::Pod>(&mut self) -> Result<T, FormatError> {
        let mut value = T::zeroed();
        self.read_bytes(bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    /// Read a `u32` element count followed by the raw bytes of every element
    pub fn read_pod_vec<T: bytemuck::Pod>(&mut self) -> Result<Vec<T>, FormatError> {
        let count = self.read_u32()? as usize;
        let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED_ELEMENTS));
        for _ in 0..count {
            values.push(self.read_pod()?);
        }
        Ok(values)
    }
}

//! Little-endian binary writer

use std::io::Write;

use super::FormatError;
use crate::foundation::math::{Quat, ScaledTransform, Vec3};

/// Writes scene records to any [`Write`] sink
pub struct BinaryWriter<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> BinaryWriter<W> {
    /// Wrap a sink
    pub fn new(inner: W) -> Self {
        Self { inner, bytes_written: 0 }
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Unwrap the sink
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write raw bytes without a length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Write a single byte
    pub fn write_u8(&mut self, value: u8) -> Result<(), FormatError> {
        self.write_bytes(&[value])
    }

    /// Write a little-endian `u32`
    pub fn write_u32(&mut self, value: u32) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `u64`
    pub fn write_u64(&mut self, value: u64) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `f32`
    pub fn write_f32(&mut self, value: f32) -> Result<(), FormatError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a collection length as `u32`
    pub fn write_len(&mut self, len: usize) -> Result<(), FormatError> {
        self.write_u32(count_prefix(len)?)
    }

    /// Write a `u32` length prefix followed by UTF-8 bytes
    pub fn write_string(&mut self, value: &str) -> Result<(), FormatError> {
        let len = u32::try_from(value.len()).map_err(|_| FormatError::StringTooLong {
            length: value.len() as u64,
            limit: u32::MAX,
        })?;
        self.write_u32(len)?;
        self.write_bytes(value.as_bytes())
    }

    /// Write x, y, z
    pub fn write_vec3(&mut self, value: &Vec3) -> Result<(), FormatError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)?;
        self.write_f32(value.z)
    }

    /// Write i, j, k, w
    pub fn write_quat(&mut self, value: &Quat) -> Result<(), FormatError> {
        let q = value.quaternion();
        self.write_f32(q.i)?;
        self.write_f32(q.j)?;
        self.write_f32(q.k)?;
        self.write_f32(q.w)
    }

    /// Write origin, rotation, scale
    pub fn write_transform(&mut self, value: &ScaledTransform) -> Result<(), FormatError> {
        self.write_vec3(&value.origin)?;
        self.write_quat(&value.rotation)?;
        self.write_vec3(&value.scale)
    }

    /// Write a trivially-copyable value as raw bytes
    pub fn write_pod<T: bytemuck::Pod>(&mut self, value: &T) -> Result<(), FormatError> {
        self.write_bytes(bytemuck::bytes_of(value))
    }

    /// Write a `u32` element count followed by the raw bytes of every element
    pub fn write_pod_slice<T: bytemuck::Pod>(&mut self, values: &[T]) -> Result<(), FormatError> {
        self.write_len(values.len())?;
        self.write_bytes(bytemuck::cast_slice(values))
    }
}

fn count_prefix(len: usize) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::LengthOverflow(len as u64))
}

//! Placeable base shared by every positioned scene entity
//!
//! A [`WorldObject`] carries the scaled transform and the identity token. Its
//! record layout is `[scaled transform][identity token]` and every derived
//! record starts with it.

use std::fmt;
use std::io::{Read, Write};

use uuid::Uuid;

use crate::foundation::math::{Quat, ScaledTransform, Vec3};
use crate::io::{BinaryReader, BinaryWriter, FormatError};

/// Stable identity assigned once when an entity is created
///
/// Opaque to the scene layer: it is only generated, compared and copied
/// through serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(Uuid);

impl IdentityToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Rebuild a token from its 16 raw bytes
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw bytes of the token
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Transform plus identity
///
/// Not `Clone`: a copy would carry the same identity token.
#[derive(Debug, PartialEq)]
pub struct WorldObject {
    transform: ScaledTransform,
    identity: IdentityToken,
}

impl Default for WorldObject {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldObject {
    /// Create an identity-transformed object with a fresh token
    pub fn new() -> Self {
        Self::with_transform(ScaledTransform::identity())
    }

    /// Create an object at `transform` with a fresh token
    pub fn with_transform(transform: ScaledTransform) -> Self {
        Self {
            transform,
            identity: IdentityToken::generate(),
        }
    }

    /// Identity token
    pub fn identity(&self) -> IdentityToken {
        self.identity
    }

    /// Combined transform
    pub fn transform(&self) -> &ScaledTransform {
        &self.transform
    }

    /// Mutable combined transform for bulk edits
    pub fn transform_mut(&mut self) -> &mut ScaledTransform {
        &mut self.transform
    }

    /// Replace the combined transform
    pub fn set_transform(&mut self, transform: ScaledTransform) {
        self.transform = transform;
    }

    /// Position
    pub fn position(&self) -> Vec3 {
        self.transform.origin
    }

    /// Set position
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.origin = position;
    }

    /// Rotation
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Set rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    /// Scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Set scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    /// Write `[scaled transform][identity token]`
    pub fn serialize<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<(), FormatError> {
        writer.write_transform(&self.transform)?;
        writer.write_pod(self.identity.as_bytes())
    }

    /// Read a record written by [`WorldObject::serialize`]
    ///
    /// The layout has not changed across format versions.
    pub fn deserialize<R: Read>(
        _version: u32,
        reader: &mut BinaryReader<R>,
    ) -> Result<Self, FormatError> {
        let transform = reader.read_transform()?;
        let identity = IdentityToken::from_bytes(reader.read_pod()?);
        Ok(Self { transform, identity })
    }
}

/// Access to the embedded [`WorldObject`] of a placeable entity
pub trait WorldEntity {
    /// Embedded world object
    fn world_object(&self) -> &WorldObject;

    /// Mutable embedded world object
    fn world_object_mut(&mut self) -> &mut WorldObject;

    /// Identity token
    fn identity(&self) -> IdentityToken {
        self.world_object().identity()
    }

    /// Combined transform
    fn transform(&self) -> &ScaledTransform {
        self.world_object().transform()
    }

    /// Position
    fn position(&self) -> Vec3 {
        self.world_object().position()
    }

    /// Set position
    fn set_position(&mut self, position: Vec3) {
        self.world_object_mut().set_position(position);
    }

    /// Rotation
    fn rotation(&self) -> Quat {
        self.world_object().rotation()
    }

    /// Set rotation
    fn set_rotation(&mut self, rotation: Quat) {
        self.world_object_mut().set_rotation(rotation);
    }

    /// Scale
    fn scale(&self) -> Vec3 {
        self.world_object().scale()
    }

    /// Set scale
    fn set_scale(&mut self, scale: Vec3) {
        self.world_object_mut().set_scale(scale);
    }
}

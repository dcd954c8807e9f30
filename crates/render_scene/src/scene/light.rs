//! Light sources
//!
//! A light record is the [`WorldObject`] header followed by every light field
//! in declared order, each written individually:
//!
//! | Field        | Type      | Since |
//! |--------------|-----------|-------|
//! | `light_type` | `u32`     | 1     |
//! | `shape`      | `u32`     | 1     |
//! | `color`      | 3 x `f32` | 1     |
//! | `intensity`  | `f32`     | 1     |
//! | `size`       | `f32`     | 1     |
//! | `cone_angle` | `f32`     | 1     |
//! | `cone_blend` | `f32`     | 1     |
//! | `axis_u`     | 3 x `f32` | 2     |
//! | `axis_v`     | 3 x `f32` | 2     |
//! | `size_u`     | `f32`     | 2     |
//! | `size_v`     | `f32`     | 2     |
//!
//! New fields may only be appended at the end of the table.

use std::io::{Read, Write};

use super::base_object::{Finalize, FinalizeState};
use super::world_object::{WorldEntity, WorldObject};
use crate::foundation::math::{Rgb, Rgba, Vec3};
use crate::io::{self, BinaryReader, BinaryWriter, FormatError, FORMAT_VERSION_AREA_AXES};

/// Emission model of a light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    /// Omnidirectional point emitter
    #[default]
    Point,
    /// Cone-limited emitter; the only type that reads the cone fields
    Spot,
    /// Emitting surface spanned by the two axes
    Area,
    /// Infinitely distant directional emitter
    Sun,
}

impl LightType {
    /// Stream tag
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Point => 0,
            Self::Spot => 1,
            Self::Area => 2,
            Self::Sun => 3,
        }
    }
}

impl TryFrom<u32> for LightType {
    type Error = FormatError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Point),
            1 => Ok(Self::Spot),
            2 => Ok(Self::Area),
            3 => Ok(Self::Sun),
            _ => Err(FormatError::InvalidDiscriminant { kind: "light type", value }),
        }
    }
}

/// Outline of an area light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightShape {
    /// Square of side `size`
    #[default]
    Square,
    /// Rectangle of `size_u` by `size_v`
    Rectangle,
    /// Disk of diameter `size`
    Disk,
    /// Ellipse with diameters `size_u` and `size_v`
    Ellipse,
}

impl LightShape {
    /// Stream tag
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Square => 0,
            Self::Rectangle => 1,
            Self::Disk => 2,
            Self::Ellipse => 3,
        }
    }
}

impl TryFrom<u32> for LightShape {
    type Error = FormatError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Square),
            1 => Ok(Self::Rectangle),
            2 => Ok(Self::Disk),
            3 => Ok(Self::Ellipse),
            _ => Err(FormatError::InvalidDiscriminant { kind: "light shape", value }),
        }
    }
}

/// Light source placed in a scene
#[derive(Debug)]
pub struct Light {
    world: WorldObject,
    state: FinalizeState,
    light_type: LightType,
    shape: LightShape,
    color: Rgb,
    intensity: f32,
    size: f32,
    cone_angle: f32,
    cone_blend: f32,
    axis_u: Vec3,
    axis_v: Vec3,
    size_u: f32,
    size_v: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(LightType::default())
    }
}

impl Light {
    /// Create a white light of the given type at the origin
    pub fn new(light_type: LightType) -> Self {
        Self::with_world_object(WorldObject::new(), light_type)
    }

    fn with_world_object(world: WorldObject, light_type: LightType) -> Self {
        Self {
            world,
            state: FinalizeState::new(),
            light_type,
            shape: LightShape::default(),
            color: Rgb::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            size: 0.0,
            cone_angle: std::f32::consts::FRAC_PI_4,
            cone_blend: 0.15,
            axis_u: Vec3::x(),
            axis_v: Vec3::y(),
            size_u: 1.0,
            size_v: 1.0,
        }
    }

    /// Emission model
    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Set emission model
    pub fn set_light_type(&mut self, light_type: LightType) {
        self.light_type = light_type;
    }

    /// Area outline
    pub fn shape(&self) -> LightShape {
        self.shape
    }

    /// Set area outline
    pub fn set_shape(&mut self, shape: LightShape) {
        self.shape = shape;
    }

    /// Color, without alpha
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Set color; alpha is discarded
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color.xyz();
    }

    /// Intensity in lumens
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set intensity in lumens
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Emitter size
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Set emitter size
    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    /// Outer cone angle in radians
    pub fn cone_angle(&self) -> f32 {
        self.cone_angle
    }

    /// Fraction of the cone over which the edge softens
    pub fn cone_blend(&self) -> f32 {
        self.cone_blend
    }

    /// Set outer cone angle and blend fraction together
    ///
    /// The blend is relative to the outer angle, so the pair is set as a unit.
    pub fn set_cone_angle(&mut self, outer_angle: f32, blend: f32) {
        self.cone_angle = outer_angle;
        self.cone_blend = blend;
    }

    /// First area axis
    pub fn axis_u(&self) -> Vec3 {
        self.axis_u
    }

    /// Extent along the first area axis
    pub fn size_u(&self) -> f32 {
        self.size_u
    }

    /// Set first area axis and the extent along it
    pub fn set_axis_u(&mut self, axis: Vec3, size: f32) {
        self.axis_u = axis;
        self.size_u = size;
    }

    /// Second area axis
    pub fn axis_v(&self) -> Vec3 {
        self.axis_v
    }

    /// Extent along the second area axis
    pub fn size_v(&self) -> f32 {
        self.size_v
    }

    /// Set second area axis and the extent along it
    pub fn set_axis_v(&mut self, axis: Vec3, size: f32) {
        self.axis_v = axis;
        self.size_v = size;
    }

    /// Write the world object header, then every light field in declared order
    pub fn serialize<W: Write>(&self, writer: &mut BinaryWriter<W>) -> Result<(), FormatError> {
        self.world.serialize(writer)?;

        writer.write_u32(self.light_type.to_raw())?;
        writer.write_u32(self.shape.to_raw())?;
        writer.write_vec3(&self.color)?;
        writer.write_f32(self.intensity)?;
        writer.write_f32(self.size)?;
        writer.write_f32(self.cone_angle)?;
        writer.write_f32(self.cone_blend)?;

        writer.write_vec3(&self.axis_u)?;
        writer.write_vec3(&self.axis_v)?;
        writer.write_f32(self.size_u)?;
        writer.write_f32(self.size_v)
    }

    /// Read a light record written with format `version`
    ///
    /// Records older than version 2 keep the default area axes and sizes.
    pub fn deserialize<R: Read>(version: u32, reader: &mut BinaryReader<R>) -> Result<Self, FormatError> {
        let version = io::check_version(version)?;
        let world = WorldObject::deserialize(version, reader)?;

        let light_type = LightType::try_from(reader.read_u32()?)?;
        let mut light = Self::with_world_object(world, light_type);
        light.shape = LightShape::try_from(reader.read_u32()?)?;
        light.color = reader.read_vec3()?;
        light.intensity = reader.read_f32()?;
        light.size = reader.read_f32()?;
        light.cone_angle = reader.read_f32()?;
        light.cone_blend = reader.read_f32()?;

        if version >= FORMAT_VERSION_AREA_AXES {
            light.axis_u = reader.read_vec3()?;
            light.axis_v = reader.read_vec3()?;
            light.size_u = reader.read_f32()?;
            light.size_v = reader.read_f32()?;
        }

        Ok(light)
    }
}

impl WorldEntity for Light {
    fn world_object(&self) -> &WorldObject {
        &self.world
    }

    fn world_object_mut(&mut self) -> &mut WorldObject {
        &mut self.world
    }
}

// Lights have no dependents to link.
impl Finalize for Light {
    fn finalize_state(&self) -> &FinalizeState {
        &self.state
    }

    fn finalize_state_mut(&mut self) -> &mut FinalizeState {
        &mut self.state
    }
}

//! Technique Parameters
//!
//! A technique declares the uniforms it consumes as a list of
//! [`TechniqueParam`]s (name, [`ParamType`], optional array size, optional
//! default). Materials supply concrete [`ParamValue`]s by name.
//!
//! Value resolution at draw time falls back from the material value, to the
//! declared default, to a per-type global default ([`ParamValue::type_default`]
//! for plain values, the renderer's configured default textures for
//! samplers).

use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use smallvec::SmallVec;

use crate::renderer::device::{TextureHandle, UniformValue};

/// Declared type of a technique parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Int2,
    Int3,
    Int4,
    Float,
    Float2,
    Float3,
    Float4,
    Color3,
    Color4,
    Mat2,
    Mat3,
    Mat4,
    Texture2D,
    TextureCube,
}

impl ParamType {
    /// Scalars occupied by one element when flattened.
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            ParamType::Int
            | ParamType::Float
            | ParamType::Texture2D
            | ParamType::TextureCube => 1,
            ParamType::Int2 | ParamType::Float2 => 2,
            ParamType::Int3 | ParamType::Float3 | ParamType::Color3 => 3,
            ParamType::Int4 | ParamType::Float4 | ParamType::Color4 | ParamType::Mat2 => 4,
            ParamType::Mat3 => 9,
            ParamType::Mat4 => 16,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_texture(self) -> bool {
        matches!(self, ParamType::Texture2D | ParamType::TextureCube)
    }

    /// Three-component and 3×3 element types cannot be packed into uniform
    /// arrays.
    #[inline]
    #[must_use]
    pub const fn supports_array(self) -> bool {
        !matches!(
            self,
            ParamType::Int3 | ParamType::Float3 | ParamType::Color3 | ParamType::Mat3
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(
            self,
            ParamType::Int | ParamType::Int2 | ParamType::Int3 | ParamType::Int4
        )
    }
}

/// A concrete parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Int2(IVec2),
    Int3(IVec3),
    Int4(IVec4),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Color3(Vec3),
    Color4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
    Texture(TextureHandle),
    TextureArray(SmallVec<[TextureHandle; 4]>),
    /// Elements of a sized (array) parameter.
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// Built-in default for non-texture types.
    ///
    /// Colors default to opaque black, matrices to identity, everything
    /// else to zero. Texture types have no built-in default.
    #[must_use]
    pub fn type_default(ty: ParamType) -> Option<ParamValue> {
        Some(match ty {
            ParamType::Int => ParamValue::Int(0),
            ParamType::Int2 => ParamValue::Int2(IVec2::ZERO),
            ParamType::Int3 => ParamValue::Int3(IVec3::ZERO),
            ParamType::Int4 => ParamValue::Int4(IVec4::ZERO),
            ParamType::Float => ParamValue::Float(0.0),
            ParamType::Float2 => ParamValue::Float2(Vec2::ZERO),
            ParamType::Float3 => ParamValue::Float3(Vec3::ZERO),
            ParamType::Float4 => ParamValue::Float4(Vec4::ZERO),
            ParamType::Color3 => ParamValue::Color3(Vec3::ZERO),
            ParamType::Color4 => ParamValue::Color4(Vec4::new(0.0, 0.0, 0.0, 1.0)),
            ParamType::Mat2 => ParamValue::Mat2(Mat2::IDENTITY),
            ParamType::Mat3 => ParamValue::Mat3(Mat3::IDENTITY),
            ParamType::Mat4 => ParamValue::Mat4(Mat4::IDENTITY),
            ParamType::Texture2D | ParamType::TextureCube => return None,
        })
    }

    /// Whether this value has the shape a `(ty, size)` param expects.
    ///
    /// Color and float vectors of the same width are interchangeable. Array
    /// lengths are not checked here.
    #[must_use]
    pub fn matches(&self, ty: ParamType, size: Option<usize>) -> bool {
        match (size, self) {
            (Some(_), ParamValue::TextureArray(_)) => ty.is_texture(),
            (Some(_), ParamValue::Array(elements)) => {
                !ty.is_texture() && elements.iter().all(|e| e.matches(ty, None))
            }
            (Some(_), _) => false,
            (None, value) => matches!(
                (value, ty),
                (ParamValue::Int(_), ParamType::Int)
                    | (ParamValue::Int2(_), ParamType::Int2)
                    | (ParamValue::Int3(_), ParamType::Int3)
                    | (ParamValue::Int4(_), ParamType::Int4)
                    | (ParamValue::Float(_), ParamType::Float)
                    | (ParamValue::Float2(_), ParamType::Float2)
                    | (
                        ParamValue::Float3(_) | ParamValue::Color3(_),
                        ParamType::Float3 | ParamType::Color3
                    )
                    | (
                        ParamValue::Float4(_) | ParamValue::Color4(_),
                        ParamType::Float4 | ParamType::Color4
                    )
                    | (ParamValue::Mat2(_), ParamType::Mat2)
                    | (ParamValue::Mat3(_), ParamType::Mat3)
                    | (ParamValue::Mat4(_), ParamType::Mat4)
                    | (ParamValue::Texture(_), ParamType::Texture2D | ParamType::TextureCube)
            ),
        }
    }

    /// Converts a single (non-array, non-texture) value for upload.
    #[must_use]
    pub fn to_uniform(&self) -> Option<UniformValue<'static>> {
        Some(match self {
            ParamValue::Int(v) => UniformValue::Int(*v),
            ParamValue::Int2(v) => UniformValue::Int2(v.to_array()),
            ParamValue::Int3(v) => UniformValue::Int3(v.to_array()),
            ParamValue::Int4(v) => UniformValue::Int4(v.to_array()),
            ParamValue::Float(v) => UniformValue::Float(*v),
            ParamValue::Float2(v) => UniformValue::Float2(v.to_array()),
            ParamValue::Float3(v) | ParamValue::Color3(v) => UniformValue::Float3(v.to_array()),
            ParamValue::Float4(v) | ParamValue::Color4(v) => UniformValue::Float4(v.to_array()),
            ParamValue::Mat2(v) => UniformValue::Mat2(v.to_cols_array()),
            ParamValue::Mat3(v) => UniformValue::Mat3(v.to_cols_array()),
            ParamValue::Mat4(v) => UniformValue::Mat4(v.to_cols_array()),
            ParamValue::Texture(_) | ParamValue::TextureArray(_) | ParamValue::Array(_) => {
                return None;
            }
        })
    }

    /// Writes the flattened integer components of one array element.
    ///
    /// Returns the number of scalars written, or `None` when the element is
    /// not integer-typed or `out` is too short.
    pub fn write_ints(&self, out: &mut [i32]) -> Option<usize> {
        let (data, len): ([i32; 4], usize) = match self {
            ParamValue::Int(v) => ([*v, 0, 0, 0], 1),
            ParamValue::Int2(v) => ([v.x, v.y, 0, 0], 2),
            ParamValue::Int4(v) => (v.to_array(), 4),
            _ => return None,
        };
        out.get_mut(..len)?.copy_from_slice(&data[..len]);
        Some(len)
    }

    /// Float counterpart of [`write_ints`](Self::write_ints).
    pub fn write_floats(&self, out: &mut [f32]) -> Option<usize> {
        let mut tmp = [0.0_f32; 16];
        let len = match self {
            ParamValue::Float(v) => {
                tmp[0] = *v;
                1
            }
            ParamValue::Float2(v) => {
                tmp[..2].copy_from_slice(&v.to_array());
                2
            }
            ParamValue::Float4(v) | ParamValue::Color4(v) => {
                tmp[..4].copy_from_slice(&v.to_array());
                4
            }
            ParamValue::Mat2(v) => {
                tmp[..4].copy_from_slice(&v.to_cols_array());
                4
            }
            ParamValue::Mat4(v) => {
                tmp = v.to_cols_array();
                16
            }
            _ => return None,
        };
        out.get_mut(..len)?.copy_from_slice(&tmp[..len]);
        Some(len)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<Vec2> for ParamValue {
    fn from(v: Vec2) -> Self {
        ParamValue::Float2(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        ParamValue::Float3(v)
    }
}

impl From<Vec4> for ParamValue {
    fn from(v: Vec4) -> Self {
        ParamValue::Float4(v)
    }
}

impl From<Mat4> for ParamValue {
    fn from(v: Mat4) -> Self {
        ParamValue::Mat4(v)
    }
}

impl From<TextureHandle> for ParamValue {
    fn from(v: TextureHandle) -> Self {
        ParamValue::Texture(v)
    }
}

/// One uniform declared by a technique.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueParam {
    pub name: String,
    pub ty: ParamType,
    /// Element count for array parameters.
    pub size: Option<usize>,
    pub default: Option<ParamValue>,
}

impl TechniqueParam {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            size: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

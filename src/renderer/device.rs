//! Graphics Device Interface
//!
//! The renderer never talks to a GPU API directly. Everything it needs is
//! expressed through [`GraphicsDevice`]: a synchronous, state-setting command
//! interface in the style of classic immediate-mode APIs.
//!
//! # State Contract
//!
//! Pending fixed-function state (blend, depth, stencil, cull) is assumed to
//! return to its defaults after every [`GraphicsDevice::draw`]. Passes
//! therefore only ever *enable* state; nothing is diffed against the previous
//! pass.
//!
//! State enums reuse the `wgpu` types so a real backend can forward them
//! without translation.
//!
//! # Testing
//!
//! [`RecordingDevice`] implements the trait by appending every call to a
//! list of [`DeviceCall`]s, which tests can then inspect.

use wgpu::{BlendFactor, BlendOperation, Color, CompareFunction, Face, PrimitiveTopology, StencilOperation};

use crate::errors::DeviceError;

// ============================================================================
// Handles
// ============================================================================

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw device-side id.
            #[inline]
            #[must_use]
            pub fn id(self) -> u32 {
                self.0
            }
        }
    };
}

define_handle!(
    /// A linked vertex + fragment program owned by the device.
    ProgramHandle
);
define_handle!(
    /// A vertex buffer created by the caller.
    VertexBufferHandle
);
define_handle!(
    /// An index buffer created by the caller.
    IndexBufferHandle
);
define_handle!(
    /// A 2D or cube texture created by the caller.
    TextureHandle
);

// ============================================================================
// Uniform Values
// ============================================================================

/// A value handed to [`GraphicsDevice::set_uniform`].
///
/// Matrices are column-major. Array variants borrow frame-scoped scratch
/// memory and are only valid for the duration of the call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    Int(i32),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    IntArray(&'a [i32]),
    FloatArray(&'a [f32]),
}

/// Owned, flattened copy of a [`UniformValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum UniformData {
    Ints(Vec<i32>),
    Floats(Vec<f32>),
}

impl From<UniformValue<'_>> for UniformData {
    fn from(value: UniformValue<'_>) -> Self {
        match value {
            UniformValue::Int(v) => UniformData::Ints(vec![v]),
            UniformValue::Int2(v) => UniformData::Ints(v.to_vec()),
            UniformValue::Int3(v) => UniformData::Ints(v.to_vec()),
            UniformValue::Int4(v) => UniformData::Ints(v.to_vec()),
            UniformValue::IntArray(v) => UniformData::Ints(v.to_vec()),
            UniformValue::Float(v) => UniformData::Floats(vec![v]),
            UniformValue::Float2(v) => UniformData::Floats(v.to_vec()),
            UniformValue::Float3(v) => UniformData::Floats(v.to_vec()),
            UniformValue::Float4(v) | UniformValue::Mat2(v) => UniformData::Floats(v.to_vec()),
            UniformValue::Mat3(v) => UniformData::Floats(v.to_vec()),
            UniformValue::Mat4(v) => UniformData::Floats(v.to_vec()),
            UniformValue::FloatArray(v) => UniformData::Floats(v.to_vec()),
        }
    }
}

/// Which buffers to clear at frame start, and to what.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOptions {
    pub color: Option<Color>,
    pub depth: Option<f32>,
    pub stencil: Option<u32>,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            color: Some(Color {
                r: 0.2,
                g: 0.3,
                b: 0.47,
                a: 1.0,
            }),
            depth: Some(1.0),
            stencil: None,
        }
    }
}

// ============================================================================
// Device Trait
// ============================================================================

/// Synchronous command interface consumed by the renderer.
pub trait GraphicsDevice {
    /// Compiles both stages and links them into a program.
    fn compile_and_link(&mut self, vertex: &str, fragment: &str)
    -> Result<ProgramHandle, DeviceError>;

    fn set_vertex_buffer(&mut self, stream: u32, buffer: VertexBufferHandle);
    fn set_index_buffer(&mut self, buffer: IndexBufferHandle);
    fn set_primitive_type(&mut self, topology: PrimitiveTopology);
    fn set_program(&mut self, program: ProgramHandle);

    fn set_uniform(&mut self, name: &str, value: UniformValue<'_>);
    fn set_texture(&mut self, name: &str, texture: TextureHandle, slot: i32);
    fn set_texture_array(&mut self, name: &str, textures: &[TextureHandle], slots: &[i32]);

    /// `None` disables face culling.
    fn set_cull_mode(&mut self, face: Option<Face>);

    fn enable_blend(&mut self);
    fn set_blend_func_sep(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );
    fn set_blend_eq_sep(&mut self, color: BlendOperation, alpha: BlendOperation);
    fn set_blend_color(&mut self, color: Color);

    fn enable_depth_test(&mut self);
    fn enable_depth_write(&mut self);
    fn set_depth_func(&mut self, func: CompareFunction);

    fn enable_stencil_test(&mut self);
    fn set_stencil_func_front(&mut self, func: CompareFunction, reference: u32, mask: u32);
    fn set_stencil_func_back(&mut self, func: CompareFunction, reference: u32, mask: u32);
    fn set_stencil_op_front(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    );
    fn set_stencil_op_back(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    );

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn clear(&mut self, options: &ClearOptions);

    /// Issues a draw with the pending state, then resets that state.
    fn draw(&mut self, start: u32, count: u32);
}

// ============================================================================
// Recording Device
// ============================================================================

/// One recorded [`GraphicsDevice`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CompileAndLink {
        vertex: String,
        fragment: String,
    },
    SetVertexBuffer {
        stream: u32,
        buffer: VertexBufferHandle,
    },
    SetIndexBuffer(IndexBufferHandle),
    SetPrimitiveType(PrimitiveTopology),
    SetProgram(ProgramHandle),
    SetUniform {
        name: String,
        value: UniformData,
    },
    SetTexture {
        name: String,
        texture: TextureHandle,
        slot: i32,
    },
    SetTextureArray {
        name: String,
        textures: Vec<TextureHandle>,
        slots: Vec<i32>,
    },
    SetCullMode(Option<Face>),
    EnableBlend,
    SetBlendFuncSep {
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    },
    SetBlendEqSep {
        color: BlendOperation,
        alpha: BlendOperation,
    },
    SetBlendColor(Color),
    EnableDepthTest,
    EnableDepthWrite,
    SetDepthFunc(CompareFunction),
    EnableStencilTest,
    SetStencilFuncFront {
        func: CompareFunction,
        reference: u32,
        mask: u32,
    },
    SetStencilFuncBack {
        func: CompareFunction,
        reference: u32,
        mask: u32,
    },
    SetStencilOpFront {
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    },
    SetStencilOpBack {
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    },
    SetViewport {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Clear(ClearOptions),
    Draw {
        start: u32,
        count: u32,
    },
}

/// A [`GraphicsDevice`] that records calls instead of executing them.
///
/// Program handles are handed out sequentially starting at 1. Linking can be
/// made to fail with [`RecordingDevice::fail_links`].
///
/// ```rust,ignore
/// let mut device = RecordingDevice::new();
/// device.draw(0, 3);
/// assert_eq!(device.draw_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_program: u32,
    fail_links: bool,
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `compile_and_link` calls fail (or succeed again).
    pub fn fail_links(&mut self, fail: bool) {
        self.fail_links = fail;
    }

    #[inline]
    #[must_use]
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Returns and forgets everything recorded so far.
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of `compile_and_link` calls, successful or not.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::CompileAndLink { .. }))
            .count()
    }

    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::Draw { .. }))
            .count()
    }

    /// Programs bound by `set_program`, in call order.
    #[must_use]
    pub fn bound_programs(&self) -> Vec<ProgramHandle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetProgram(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Most recent value set for the uniform `name`.
    #[must_use]
    pub fn last_uniform(&self, name: &str) -> Option<&UniformData> {
        self.calls.iter().rev().find_map(|c| match c {
            DeviceCall::SetUniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    fn record(&mut self, call: DeviceCall) {
        self.calls.push(call);
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_and_link(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramHandle, DeviceError> {
        self.record(DeviceCall::CompileAndLink {
            vertex: vertex.to_owned(),
            fragment: fragment.to_owned(),
        });
        if self.fail_links {
            return Err(DeviceError::LinkFailed("link rejected by recording device".into()));
        }
        self.next_program += 1;
        Ok(ProgramHandle(self.next_program))
    }

    fn set_vertex_buffer(&mut self, stream: u32, buffer: VertexBufferHandle) {
        self.record(DeviceCall::SetVertexBuffer { stream, buffer });
    }

    fn set_index_buffer(&mut self, buffer: IndexBufferHandle) {
        self.record(DeviceCall::SetIndexBuffer(buffer));
    }

    fn set_primitive_type(&mut self, topology: PrimitiveTopology) {
        self.record(DeviceCall::SetPrimitiveType(topology));
    }

    fn set_program(&mut self, program: ProgramHandle) {
        self.record(DeviceCall::SetProgram(program));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue<'_>) {
        self.record(DeviceCall::SetUniform {
            name: name.to_owned(),
            value: value.into(),
        });
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, slot: i32) {
        self.record(DeviceCall::SetTexture {
            name: name.to_owned(),
            texture,
            slot,
        });
    }

    fn set_texture_array(&mut self, name: &str, textures: &[TextureHandle], slots: &[i32]) {
        self.record(DeviceCall::SetTextureArray {
            name: name.to_owned(),
            textures: textures.to_vec(),
            slots: slots.to_vec(),
        });
    }

    fn set_cull_mode(&mut self, face: Option<Face>) {
        self.record(DeviceCall::SetCullMode(face));
    }

    fn enable_blend(&mut self) {
        self.record(DeviceCall::EnableBlend);
    }

    fn set_blend_func_sep(
        &mut self,
        src: BlendFactor,
        dst: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(DeviceCall::SetBlendFuncSep {
            src,
            dst,
            src_alpha,
            dst_alpha,
        });
    }

    fn set_blend_eq_sep(&mut self, color: BlendOperation, alpha: BlendOperation) {
        self.record(DeviceCall::SetBlendEqSep { color, alpha });
    }

    fn set_blend_color(&mut self, color: Color) {
        self.record(DeviceCall::SetBlendColor(color));
    }

    fn enable_depth_test(&mut self) {
        self.record(DeviceCall::EnableDepthTest);
    }

    fn enable_depth_write(&mut self) {
        self.record(DeviceCall::EnableDepthWrite);
    }

    fn set_depth_func(&mut self, func: CompareFunction) {
        self.record(DeviceCall::SetDepthFunc(func));
    }

    fn enable_stencil_test(&mut self) {
        self.record(DeviceCall::EnableStencilTest);
    }

    fn set_stencil_func_front(&mut self, func: CompareFunction, reference: u32, mask: u32) {
        self.record(DeviceCall::SetStencilFuncFront {
            func,
            reference,
            mask,
        });
    }

    fn set_stencil_func_back(&mut self, func: CompareFunction, reference: u32, mask: u32) {
        self.record(DeviceCall::SetStencilFuncBack {
            func,
            reference,
            mask,
        });
    }

    fn set_stencil_op_front(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    ) {
        self.record(DeviceCall::SetStencilOpFront {
            fail,
            depth_fail,
            pass,
            write_mask,
        });
    }

    fn set_stencil_op_back(
        &mut self,
        fail: StencilOperation,
        depth_fail: StencilOperation,
        pass: StencilOperation,
        write_mask: u32,
    ) {
        self.record(DeviceCall::SetStencilOpBack {
            fail,
            depth_fail,
            pass,
            write_mask,
        });
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.record(DeviceCall::SetViewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear(&mut self, options: &ClearOptions) {
        self.record(DeviceCall::Clear(*options));
    }

    fn draw(&mut self, start: u32, count: u32) {
        self.record(DeviceCall::Draw { start, count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_handles_are_sequential() {
        let mut device = RecordingDevice::new();
        let a = device.compile_and_link("v", "f").unwrap();
        let b = device.compile_and_link("v", "f").unwrap();
        assert_eq!(a, ProgramHandle(1));
        assert_eq!(b, ProgramHandle(2));
        assert_eq!(device.link_count(), 2);
    }

    #[test]
    fn failed_links_are_recorded_but_return_errors() {
        let mut device = RecordingDevice::new();
        device.fail_links(true);
        assert!(device.compile_and_link("v", "f").is_err());
        assert_eq!(device.link_count(), 1);
    }

    #[test]
    fn uniform_arrays_are_copied() {
        let mut device = RecordingDevice::new();
        let scratch = [1.0_f32, 2.0, 3.0];
        device.set_uniform("weights", UniformValue::FloatArray(&scratch[..2]));
        assert_eq!(
            device.last_uniform("weights"),
            Some(&UniformData::Floats(vec![1.0, 2.0]))
        );
    }
}

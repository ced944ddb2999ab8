//! Draw Items & Per-Item Drawing
//!
//! Collection produces one [`DrawItem`] per (model, mesh) pair. Each stage
//! then derives a [`StageItem`] for every draw item whose material has a
//! technique for that stage, carrying the sort keys the stage routine needs.
//!
//! [`DrawContext::draw_item`] turns a stage item into device calls:
//!
//! ```text
//! model / normalMatrix uniforms
//! technique params   material value → param default → global default
//!                    (values of the wrong type are skipped)
//! for each pass      buffers → program → fixed-function state → draw
//! ```

use glam::{Mat3, Mat4};

use super::frame_pool::FramePool;
use crate::renderer::device::{GraphicsDevice, UniformValue};
use crate::renderer::pipeline::ProgramLib;
use crate::renderer::settings::RendererSettings;
use crate::resources::{Material, Mesh, ParamType, ParamValue, Pass, ProgramSource, TechniqueParam};
use crate::scene::{ModelKey, Scene};

/// Scalars in one array-uniform scratch buffer.
pub const SCRATCH_LEN: usize = 64;

/// One (model, mesh) pair and the material it draws with.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawItem {
    pub model: ModelKey,
    pub mesh: usize,
    pub material: usize,
}

/// A draw item bound to the technique a stage selected for it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageItem {
    pub model: ModelKey,
    pub mesh: usize,
    pub material: usize,
    pub technique: usize,
    pub layer: i32,
    pub sort_id: u64,
    /// View-space distance along the camera forward axis. Only filled in by
    /// stages that sort by depth.
    pub zdist: f32,
    /// Collection order, the final tie-breaker of every sort.
    pub seq: u32,
}

/// Counters of one `render` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_items: usize,
    pub stage_items: usize,
    pub draw_calls: usize,
    /// Passes dropped because their program could not be resolved.
    pub skipped_passes: usize,
}

/// Everything a stage routine needs to issue draws.
pub struct DrawContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub programs: &'a mut ProgramLib,
    pub settings: &'a RendererSettings,
    pub stats: &'a mut FrameStats,
    pub(crate) float_scratch: &'a mut FramePool<[f32; SCRATCH_LEN]>,
    pub(crate) int_scratch: &'a mut FramePool<[i32; SCRATCH_LEN]>,
}

impl DrawContext<'_> {
    pub fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.device
            .set_uniform(name, UniformValue::Mat4(value.to_cols_array()));
    }

    /// Issues every pass of the item's technique.
    pub fn draw_item(&mut self, scene: &Scene, item: &StageItem) {
        let Some(model) = scene.model(item.model) else {
            log::warn!("Stage item refers to a removed model, skipped.");
            return;
        };
        let (Some(mesh), Some(material)) = (
            model.meshes().get(item.mesh),
            model.materials().get(item.material),
        ) else {
            log::warn!("Stage item refers to a missing mesh or material, skipped.");
            return;
        };
        let Some(technique) = material.techniques().get(item.technique) else {
            log::warn!("Stage item refers to a missing technique, skipped.");
            return;
        };

        let world = model.node().world_matrix();
        self.set_mat4("model", &world);
        let normal = Mat3::from_mat4(world).inverse().transpose();
        self.device
            .set_uniform("normalMatrix", UniformValue::Mat3(normal.to_cols_array()));

        self.float_scratch.reset();
        self.int_scratch.reset();

        let mut slot = 0;
        for param in technique.params() {
            self.bind_param(param, material, &mut slot);
        }

        for pass in technique.passes() {
            self.draw_pass(pass, mesh, material);
        }
    }

    fn global_default(&self, param: &TechniqueParam) -> Option<ParamValue> {
        let single = match param.ty {
            ParamType::Texture2D => self.settings.default_texture_2d.map(ParamValue::Texture),
            ParamType::TextureCube => self.settings.default_texture_cube.map(ParamValue::Texture),
            ty => ParamValue::type_default(ty),
        }?;

        Some(match (param.size, single) {
            (None, value) => value,
            (Some(size), ParamValue::Texture(tex)) => {
                ParamValue::TextureArray(std::iter::repeat_n(tex, size).collect())
            }
            (Some(size), value) => ParamValue::Array(vec![value; size]),
        })
    }

    fn bind_param(&mut self, param: &TechniqueParam, material: &Material, slot: &mut i32) {
        let name = param.name.as_str();
        let fallback;
        let explicit = [
            ("material value", material.value(name)),
            ("default", param.default.as_ref()),
        ]
        .into_iter()
        .filter_map(|(source, value)| value.map(|v| (source, v)))
        .find(|(source, value)| {
            let fits = value.matches(param.ty, param.size);
            if !fits {
                log::warn!(
                    "Param {name}: {source} {value:?} does not match {:?}, falling back.",
                    param.ty
                );
            }
            fits
        })
        .map(|(_, value)| value);
        let value = match explicit {
            Some(value) => value,
            None => {
                fallback = self.global_default(param);
                match &fallback {
                    Some(value) => value,
                    None => {
                        log::warn!("Failed to set technique param {name}, value not found.");
                        return;
                    }
                }
            }
        };

        if param.ty.is_texture() {
            self.bind_texture(param, value, slot);
            return;
        }

        let Some(size) = param.size else {
            match value.to_uniform() {
                Some(uniform) => self.device.set_uniform(name, uniform),
                None => log::error!("Param {name}: value {value:?} does not match {:?}.", param.ty),
            }
            return;
        };

        if !param.ty.supports_array() {
            log::error!("Param {name}: arrays of {:?} are not supported.", param.ty);
            return;
        }
        if size * param.ty.components() > SCRATCH_LEN {
            log::error!(
                "Param {name}: {size} × {:?} exceeds the {SCRATCH_LEN}-scalar array limit.",
                param.ty
            );
            return;
        }
        let ParamValue::Array(elements) = value else {
            log::error!("Param {name}: expected an array of {size} elements.");
            return;
        };

        if param.ty.is_int() {
            let buf = self.int_scratch.alloc();
            let mut len = 0;
            for element in elements.iter().take(size) {
                let Some(written) = element.write_ints(&mut buf[len..]) else {
                    log::error!("Param {name}: element {element:?} is not an integer value.");
                    return;
                };
                len += written;
            }
            self.device
                .set_uniform(name, UniformValue::IntArray(&buf[..len]));
        } else {
            let buf = self.float_scratch.alloc();
            let mut len = 0;
            for element in elements.iter().take(size) {
                let Some(written) = element.write_floats(&mut buf[len..]) else {
                    log::error!("Param {name}: element {element:?} is not a float value.");
                    return;
                };
                len += written;
            }
            self.device
                .set_uniform(name, UniformValue::FloatArray(&buf[..len]));
        }
    }

    fn bind_texture(&mut self, param: &TechniqueParam, value: &ParamValue, slot: &mut i32) {
        let name = param.name.as_str();
        match (param.size, value) {
            (None, ParamValue::Texture(texture)) => {
                self.device.set_texture(name, *texture, *slot);
                *slot += 1;
            }
            (Some(size), ParamValue::TextureArray(textures)) => {
                if textures.len() != size {
                    log::error!(
                        "Param {name}: texture array has {} entries, expected {size}.",
                        textures.len()
                    );
                    return;
                }
                if size > SCRATCH_LEN {
                    log::error!("Param {name}: texture array exceeds {SCRATCH_LEN} slots.");
                    return;
                }
                let slots = self.int_scratch.alloc();
                for (offset, s) in (0_i32..).zip(slots[..size].iter_mut()) {
                    *s = *slot + offset;
                }
                self.device
                    .set_texture_array(name, textures, &slots[..size]);
                *slot += size as i32;
            }
            _ => log::error!("Param {name}: value {value:?} is not a {:?}.", param.ty),
        }
    }

    fn draw_pass(&mut self, pass: &Pass, mesh: &Mesh, material: &Material) {
        self.device.set_vertex_buffer(0, mesh.vertex_buffer);
        if let Some((indices, _)) = mesh.index_buffer {
            self.device.set_index_buffer(indices);
        }
        self.device.set_primitive_type(mesh.primitive);

        let program = match &pass.program {
            ProgramSource::Template(name) => {
                match self
                    .programs
                    .program(&mut *self.device, name, material.options())
                {
                    Ok(program) => program,
                    Err(err) => {
                        log::error!("Skipping pass of {name}: {err}");
                        self.stats.skipped_passes += 1;
                        return;
                    }
                }
            }
            ProgramSource::Linked(program) => *program,
        };
        self.device.set_program(program);

        self.device.set_cull_mode(pass.cull_mode);

        if let Some(blend) = &pass.blend {
            let (color, alpha) = (blend.state.color, blend.state.alpha);
            self.device.enable_blend();
            self.device.set_blend_func_sep(
                color.src_factor,
                color.dst_factor,
                alpha.src_factor,
                alpha.dst_factor,
            );
            self.device
                .set_blend_eq_sep(color.operation, alpha.operation);
            self.device.set_blend_color(blend.constant);
        }

        if pass.depth_test {
            self.device.enable_depth_test();
            self.device.set_depth_func(pass.depth_func);
        }
        if pass.depth_write {
            self.device.enable_depth_write();
        }

        if let Some(stencil) = &pass.stencil {
            let (front, back) = (stencil.front, stencil.back);
            self.device.enable_stencil_test();
            self.device
                .set_stencil_func_front(front.ops.compare, front.reference, front.read_mask);
            self.device.set_stencil_op_front(
                front.ops.fail_op,
                front.ops.depth_fail_op,
                front.ops.pass_op,
                front.write_mask,
            );
            self.device
                .set_stencil_func_back(back.ops.compare, back.reference, back.read_mask);
            self.device.set_stencil_op_back(
                back.ops.fail_op,
                back.ops.depth_fail_op,
                back.ops.pass_op,
                back.write_mask,
            );
        }

        self.device.draw(0, mesh.draw_count());
        self.stats.draw_calls += 1;
    }
}

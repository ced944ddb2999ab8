//! Forward Renderer
//!
//! Owns the device, the program library and every per-frame pool. Each
//! `render` call runs the same four steps and reuses all of its storage:
//!
//! ```text
//! reset pools → viewport + clear
//!     → collect DrawItems (one per model mesh)
//!     → per stage: filter into StageItems (technique present for the stage)
//!     → per stage: registered StageRoutine sorts and draws
//! ```

use rustc_hash::FxHashMap;

use super::draw::{DrawContext, DrawItem, FrameStats, SCRATCH_LEN, StageItem};
use super::frame_pool::{FramePool, RecyclePool};
use super::passes::{OpaqueStage, StageRoutine, TransparentStage};
use super::stage::StageFlags;
use crate::errors::Result;
use crate::renderer::device::GraphicsDevice;
use crate::renderer::pipeline::ProgramLib;
use crate::renderer::settings::RendererSettings;
use crate::scene::{Scene, View};

pub struct ForwardRenderer<D: GraphicsDevice> {
    device: D,
    programs: ProgramLib,
    settings: RendererSettings,
    routines: FxHashMap<StageFlags, Box<dyn StageRoutine>>,

    draw_items: RecyclePool<DrawItem>,
    stage_lists: FramePool<RecyclePool<StageItem>>,
    float_scratch: FramePool<[f32; SCRATCH_LEN]>,
    int_scratch: FramePool<[i32; SCRATCH_LEN]>,
}

impl<D: GraphicsDevice> ForwardRenderer<D> {
    /// Builds the program library (built-ins plus `settings.templates`) and
    /// registers the opaque and transparent routines.
    pub fn new(device: D, mut settings: RendererSettings) -> Result<Self> {
        let programs = ProgramLib::new(settings.program_lib_settings())?;

        let stage_capacity = settings.stage_item_capacity;
        let mut routines: FxHashMap<StageFlags, Box<dyn StageRoutine>> = FxHashMap::default();
        routines.insert(StageFlags::OPAQUE, Box::new(OpaqueStage::new()));
        routines.insert(StageFlags::TRANSPARENT, Box::new(TransparentStage::new()));

        Ok(Self {
            device,
            programs,
            draw_items: RecyclePool::new(DrawItem::default, settings.draw_item_capacity),
            stage_lists: FramePool::new(
                move || RecyclePool::new(StageItem::default, stage_capacity),
                settings.frame_pool_size,
            ),
            float_scratch: FramePool::new(|| [0.0; SCRATCH_LEN], settings.scratch_pool_size),
            int_scratch: FramePool::new(|| [0; SCRATCH_LEN], settings.scratch_pool_size),
            routines,
            settings,
        })
    }

    /// Installs the routine for `stage`, returning the one it replaces.
    pub fn register_stage(
        &mut self,
        stage: StageFlags,
        routine: Box<dyn StageRoutine>,
    ) -> Option<Box<dyn StageRoutine>> {
        self.routines.insert(stage, routine)
    }

    /// Renders the opaque then the transparent stage.
    pub fn render(&mut self, view: &View, scene: &Scene) -> FrameStats {
        self.render_stages(view, scene, &StageFlags::DEFAULT_ORDER)
    }

    /// Renders `stages` in order.
    pub fn render_stages(&mut self, view: &View, scene: &Scene, stages: &[StageFlags]) -> FrameStats {
        let mut stats = FrameStats::default();

        self.draw_items.reset();
        self.stage_lists.reset();

        let viewport = view.viewport;
        self.device
            .set_viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        self.device.clear(&view.clear);

        for (key, model) in &scene.models {
            if model.materials().is_empty() {
                log::debug!("Model {key:?} has no material, nothing to draw.");
                continue;
            }
            for mesh in 0..model.mesh_count() {
                let Some(material) = model.material_index(mesh) else {
                    continue;
                };
                *self.draw_items.add() = DrawItem {
                    model: key,
                    mesh,
                    material,
                };
            }
        }
        stats.draw_items = self.draw_items.len();

        for &stage in stages {
            let list = self.stage_lists.alloc();
            list.reset();
            for (seq, draw) in self.draw_items.as_slice().iter().enumerate() {
                let Some(material) = scene
                    .model(draw.model)
                    .and_then(|model| model.materials().get(draw.material))
                else {
                    continue;
                };
                let Some(technique) = material.technique_index(stage) else {
                    continue;
                };
                let tech = &material.techniques()[technique];
                *list.add() = StageItem {
                    model: draw.model,
                    mesh: draw.mesh,
                    material: draw.material,
                    technique,
                    layer: tech.layer(),
                    sort_id: tech.sort_id(),
                    zdist: 0.0,
                    seq: u32::try_from(seq).unwrap_or(u32::MAX),
                };
            }
            stats.stage_items += list.len();
        }

        for (&stage, list) in stages.iter().zip(self.stage_lists.active_mut()) {
            let Some(routine) = self.routines.get_mut(&stage) else {
                log::debug!("No routine registered for stage {}, skipped.", stage.name());
                continue;
            };
            log::trace!(
                "Stage {} ({}): {} items",
                stage.name(),
                routine.name(),
                list.len()
            );

            let mut ctx = DrawContext {
                device: &mut self.device,
                programs: &mut self.programs,
                settings: &self.settings,
                stats: &mut stats,
                float_scratch: &mut self.float_scratch,
                int_scratch: &mut self.int_scratch,
            };
            routine.run(&mut ctx, view, scene, list.as_mut_slice());
        }

        stats
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    #[inline]
    #[must_use]
    pub fn program_lib(&self) -> &ProgramLib {
        &self.programs
    }

    #[inline]
    pub fn program_lib_mut(&mut self) -> &mut ProgramLib {
        &mut self.programs
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Gives the device back.
    pub fn into_device(self) -> D {
        self.device
    }
}

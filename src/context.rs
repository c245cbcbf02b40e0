// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The surface context: the function table this subsystem exposes.
//!
//! A [`SurfaceContext`] bundles the collaborator seams (flush, fallback
//! blitter, region fill, render condition) with the current
//! [`RenderState`], and carries the public operations: surface lifecycle,
//! blit, clears, region copy, the pipe-level resource flush, and the
//! sample-position query.  The blit dispatcher, resolve engine, region
//! transfer and clear operators are implemented on this type in their own
//! modules.
//!
//! Everything runs synchronously on the calling thread to completion; there
//! is no internal locking and no cancellation.  Callers sharing resources
//! across threads serialize mutation themselves.

use crate::backend::{
    FallbackBlitter, RegionFill, RenderCondition, RenderConditionVerdict, RenderState,
    ResourceFlush, SavedRenderState,
};
use crate::resource::PixelResource;
use crate::surface::{SurfaceDescriptor, SurfaceTemplate};
use std::sync::Arc;

/// The subsystem's context; see the module documentation.
pub struct SurfaceContext {
    flush: Box<dyn ResourceFlush>,
    blitter: Box<dyn FallbackBlitter>,
    fill: Box<dyn RegionFill>,
    render_condition: Box<dyn RenderCondition>,
    render_state: RenderState,
}

impl SurfaceContext {
    pub fn new(
        flush: Box<dyn ResourceFlush>,
        blitter: Box<dyn FallbackBlitter>,
        fill: Box<dyn RegionFill>,
        render_condition: Box<dyn RenderCondition>,
    ) -> Self {
        Self {
            flush,
            blitter,
            fill,
            render_condition,
            render_state: RenderState::default(),
        }
    }

    /// Creates a surface view on `resource`; see
    /// [`SurfaceDescriptor::new`] for the derivation and repair rules.
    pub fn create_surface(
        &self,
        resource: &Arc<PixelResource>,
        template: &SurfaceTemplate,
    ) -> SurfaceDescriptor {
        SurfaceDescriptor::new(resource, template)
    }

    /// Releases a surface.  Consumes the descriptor, so further use is a
    /// compile error; dropping the last descriptor sharing the view releases
    /// its resource reference.  No other teardown: a software backend has no
    /// hardware layout to undo.
    pub fn destroy_surface(&self, surface: SurfaceDescriptor) {
        drop(surface);
    }

    /// Pipe-level flush hook.  This backend renders synchronously into
    /// resource storage, so there is nothing to flush.
    pub fn flush_resource(&self, _resource: &Arc<PixelResource>) {}

    /// Sample position query; see [`crate::sample_positions::sample_position`].
    pub fn sample_position(&self, sample_count: u32, sample_index: u32) -> Option<(f32, f32)> {
        crate::sample_positions::sample_position(sample_count, sample_index)
    }

    /// The rendering-context state snapshotted around fallback blits.
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.render_state
    }

    /// True if a gated operation should proceed.
    pub(crate) fn render_condition_passes(&self) -> bool {
        self.render_condition.evaluate() == RenderConditionVerdict::Proceed
    }

    /// Unconditional best-effort checkpoint of the render state; the fallback
    /// blitter restores from it.
    pub(crate) fn save_render_state(&self) -> SavedRenderState {
        SavedRenderState(self.render_state.clone())
    }

    pub(crate) fn flush(&self) -> &dyn ResourceFlush {
        &*self.flush
    }

    pub(crate) fn blitter(&self) -> &dyn FallbackBlitter {
        &*self.blitter
    }

    pub(crate) fn fill(&self) -> &dyn RegionFill {
        &*self.fill
    }
}

impl std::fmt::Debug for SurfaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceContext")
            .field("render_state", &self.render_state)
            .finish_non_exhaustive()
    }
}

// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Clear operators for render-target and depth/stencil surfaces.
//!
//! Clears write a single constant value per pixel, so no resolve or format
//! conversion is involved regardless of the destination's sample count; every
//! sample plane receives the same value, which is the region-fill
//! collaborator's job.  This module only contributes the render-condition
//! gate, shared with the blit dispatcher.

use crate::context::SurfaceContext;
use crate::surface::SurfaceDescriptor;

bitflags::bitflags! {
    /// Which aspects a depth/stencil clear touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const DEPTH = 1 << 0;
        const STENCIL = 1 << 1;
    }
}

/// Clear color in unit floats; the fill collaborator packs it per format.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl SurfaceContext {
    /// Clears a rectangle of a render-target surface to a constant color.
    ///
    /// With `render_condition_enabled` set and the render condition reporting
    /// skip, this is a no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn clear_render_target(
        &self,
        dst: &SurfaceDescriptor,
        color: &ClearColor,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        render_condition_enabled: bool,
    ) {
        if render_condition_enabled && !self.render_condition_passes() {
            return;
        }
        self.fill().clear_render_target(dst, color, x, y, width, height);
    }

    /// Clears a rectangle of a depth/stencil surface.  `flags` selects depth,
    /// stencil, or both.  Gated like [`clear_render_target`](Self::clear_render_target).
    #[allow(clippy::too_many_arguments)]
    pub fn clear_depth_stencil(
        &self,
        dst: &SurfaceDescriptor,
        flags: ClearFlags,
        depth: f64,
        stencil: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        render_condition_enabled: bool,
    ) {
        if render_condition_enabled && !self.render_condition_passes() {
            return;
        }
        self.fill()
            .clear_depth_stencil(dst, flags, depth, stencil, x, y, width, height);
    }
}

// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Collaborator seams between this subsystem and the rest of the backend.
//!
//! The blit dispatcher and clear operators sit in front of machinery this
//! crate does not implement: the triangle-based fallback blitter, the
//! query-driven render condition, the region-fill helpers, and whatever
//! pending work must be flushed before pixels are CPU-visible.  Each is a
//! trait here; embedders supply the real thing, tests supply spies.
//!
//! [`SavedRenderState`] is the checkpoint handed to the fallback blitter: the
//! full mutable rendering-context state the blitter will clobber and is
//! expected to restore.  Taking the checkpoint has no failure mode; it is an
//! unconditional best-effort snapshot.

use crate::blit::BlitRequest;
use crate::clear::{ClearColor, ClearFlags};
use crate::resource::PixelResource;
use crate::surface::SurfaceDescriptor;
use crate::transfer::FlushRequest;

/// Opaque handle to a piece of bound pipeline state (a shader, a blend object,
/// a sampler...).  The subsystem never dereferences these; it only saves and
/// restores them around the fallback blitter.
pub type StateHandle = u64;

/// Viewport rectangle with depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Render-condition binding: which query gates rendering and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConditionParams {
    pub query: StateHandle,
    /// Render when the query result matches this.
    pub condition: bool,
    pub mode: u32,
}

/// The mutable rendering-context state the fallback blitter clobbers.
///
/// Field set mirrors what a rasterizing blit rebinds: geometry inputs, both
/// shader stages, fixed-function state, framebuffer, fragment samplers and
/// views, stream output, and the render condition.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub vertex_buffer: Option<StateHandle>,
    pub vertex_elements: Option<StateHandle>,
    pub vertex_shader: Option<StateHandle>,
    pub geometry_shader: Option<StateHandle>,
    pub fragment_shader: Option<StateHandle>,
    pub stream_output_targets: Vec<StateHandle>,
    pub rasterizer: Option<StateHandle>,
    pub blend: Option<StateHandle>,
    pub depth_stencil_alpha: Option<StateHandle>,
    pub stencil_ref: [u32; 2],
    pub viewport: Viewport,
    pub scissor: ScissorRect,
    pub framebuffer: Option<StateHandle>,
    pub fragment_samplers: Vec<StateHandle>,
    pub fragment_sampler_views: Vec<StateHandle>,
    pub render_condition: Option<RenderConditionParams>,
}

/// Snapshot of [`RenderState`] taken immediately before the fallback blitter
/// runs.  The blitter restores from it internally.
#[derive(Debug, Clone)]
pub struct SavedRenderState(pub RenderState);

/// Verdict of the render-condition gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderConditionVerdict {
    /// Carry out the operation.
    Proceed,
    /// Suppress the operation entirely; it must have no observable side
    /// effects.
    Skip,
}

/// External gate that can suppress blits and clears based on prior query
/// results.
pub trait RenderCondition {
    fn evaluate(&self) -> RenderConditionVerdict;
}

/// A render condition that never skips.  The default for embedders that do not
/// wire up queries, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysRender;

impl RenderCondition for AlwaysRender {
    fn evaluate(&self) -> RenderConditionVerdict {
        RenderConditionVerdict::Proceed
    }
}

/// Makes a resource's contents visible and stable for the access mode named in
/// the request before the CPU maps it.
///
/// Within one blit or clear, the destination flush always precedes the source
/// flush, which precedes any data access.
pub trait ResourceFlush {
    fn flush_resource(&self, resource: &PixelResource, request: &FlushRequest);
}

/// A flush for backends with no pending work.  This software backend renders
/// synchronously into resource storage, so there is nothing to wait for.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPendingWork;

impl ResourceFlush for NoPendingWork {
    fn flush_resource(&self, _resource: &PixelResource, _request: &FlushRequest) {}
}

/// The generic triangle-based blitter used when neither resolve nor the
/// region-copy fast path applies.
pub trait FallbackBlitter {
    /// Whether the blitter can emulate this format/filter/target combination.
    fn is_supported(&self, request: &BlitRequest) -> bool;
    /// Performs the blit.  Receives the state snapshot it is expected to
    /// restore before returning.
    fn execute(&self, request: &BlitRequest, saved: &SavedRenderState);
}

/// Constant-value region fills backing the clear operators.
///
/// Clears need no resolve or conversion logic: every sample plane of the
/// destination receives the same value, which is the fill implementation's
/// concern, not this crate's.
pub trait RegionFill {
    fn clear_render_target(
        &self,
        dst: &SurfaceDescriptor,
        color: &ClearColor,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    );

    #[allow(clippy::too_many_arguments)]
    fn clear_depth_stencil(
        &self,
        dst: &SurfaceDescriptor,
        flags: ClearFlags,
        depth: f64,
        stencil: u32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    );
}

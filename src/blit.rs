// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The blit dispatcher and the region transfer operator.
//!
//! A blit is a copy between two surfaces that may involve format, scale, or
//! sample-count conversion.  Not every combination deserves the full
//! rasterizing path, so [`SurfaceContext::blit`] routes each request through a
//! strict priority order, cheapest first:
//!
//! | Priority | Path | When |
//! |---|---|---|
//! | 1 | nothing | render condition says skip |
//! | 2 | multisample resolve | multisampled source, single-sampled destination, averageable format |
//! | 3 | region copy | identical formats and geometry, no scaling |
//! | 4 | logged drop | the fallback blitter cannot emulate the request |
//! | 5 | fallback blitter | everything else, after a render-state checkpoint |
//!
//! Step 4 is a deliberate design choice inherited from the original backend:
//! blit is best-effort, and an unsupported combination is a diagnostic-logged
//! no-op rather than an error to the caller.

use crate::context::SurfaceContext;
use crate::pixel_formats::PixelFormat;
use crate::resource::PixelResource;
use crate::transfer::{FlushRequest, MapError};
use std::sync::Arc;

/// A box-shaped region in pixels.  `z`/`depth` span array layers or, for
/// multisampled resources, sample planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Box3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Box3 {
    pub const fn new(x: u32, y: u32, z: u32, width: u32, height: u32, depth: u32) -> Self {
        Self {
            x,
            y,
            z,
            width,
            height,
            depth,
        }
    }

    /// A single-slice box covering a full `width` by `height` area.
    pub const fn whole_2d(width: u32, height: u32) -> Self {
        Self::new(0, 0, 0, width, height, 1)
    }
}

/// Sampling filter for scaled blits.  Irrelevant on the resolve and copy
/// paths, which are never scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// One end of a blit: a resource, a mip level, a box within it, and the format
/// to interpret the pixels under.
#[derive(Debug, Clone)]
pub struct BlitEnd {
    pub resource: Arc<PixelResource>,
    pub level: u8,
    pub region: Box3,
    pub format: PixelFormat,
}

/// A transient blit request, consumed synchronously by the dispatcher.
#[derive(Debug, Clone)]
pub struct BlitRequest {
    pub src: BlitEnd,
    pub dst: BlitEnd,
    pub filter: FilterMode,
    /// When true, the render-condition collaborator may suppress the blit.
    pub render_condition_enable: bool,
}

/// Whether the request is a multisample resolve the engine can average:
/// multisampled source, at-most-single-sampled destination, and a source
/// format whose interleaved bytes can be averaged directly (8-bit
/// normalized; depth/stencil and pure-integer are excluded a fortiori).
/// Anything else falls through to the fallback blitter.
fn resolve_eligible(request: &BlitRequest) -> bool {
    let src_format = request.src.resource.format();
    request.src.resource.sample_count() > 1
        && request.dst.resource.sample_count() <= 1
        && !src_format.is_depth_or_stencil()
        && !src_format.is_pure_integer()
        && src_format.is_unorm8()
}

/// Whether the request degenerates to a raw region copy: identical formats on
/// both ends and both resources (no cast views), matching geometry class, no
/// scaling, and matching sample counts.  Flips are unrepresentable here; boxes
/// carry unsigned extents only.
fn copy_region_eligible(request: &BlitRequest) -> bool {
    let src = &request.src;
    let dst = &request.dst;
    src.format == dst.format
        && src.format == src.resource.format()
        && dst.format == dst.resource.format()
        && src.resource.is_texture() == dst.resource.is_texture()
        && src.region.width == dst.region.width
        && src.region.height == dst.region.height
        && src.region.depth == dst.region.depth
        && src.resource.sample_count().max(1) == dst.resource.sample_count().max(1)
}

impl SurfaceContext {
    /// Routes a blit request to the cheapest strategy that can honor it.
    ///
    /// Best-effort by contract: an unsupported request is logged and dropped,
    /// never surfaced as an error.  With `render_condition_enable` set and the
    /// render condition reporting skip, the call has no observable side
    /// effects at all.
    pub fn blit(&self, request: &BlitRequest) {
        if request.render_condition_enable && !self.render_condition_passes() {
            return;
        }

        if resolve_eligible(request) {
            if let Err(error) = self.resolve(request) {
                logwise::warn_sync!(
                    "resolve dropped: {error}",
                    error = logwise::privacy::LogIt(error)
                );
            }
            return;
        }

        if copy_region_eligible(request) {
            if let Err(error) = self.copy_region(
                &request.dst.resource,
                request.dst.level,
                request.dst.region.x,
                request.dst.region.y,
                request.dst.region.z,
                &request.src.resource,
                request.src.level,
                &request.src.region,
            ) {
                logwise::warn_sync!(
                    "region copy dropped: {error}",
                    error = logwise::privacy::LogIt(error)
                );
            }
            return;
        }

        if !self.blitter().is_supported(request) {
            logwise::warn_sync!(
                "blit unsupported {src_format} -> {dst_format}",
                src_format = logwise::privacy::LogIt(request.src.format),
                dst_format = logwise::privacy::LogIt(request.dst.format)
            );
            return;
        }

        let saved = self.save_render_state();
        self.blitter().execute(request, &saved);
    }

    /// Copies a box-shaped region of pixels from `src` at `src_level` to
    /// `dst` at the given origin, after making both resources CPU-visible
    /// through the flush collaborator (destination first, read-write; source
    /// second, read-only; blocking accepted on both).
    ///
    /// If the source is multisampled, the copied box's depth is reinterpreted
    /// as the sample count so that every sample plane is carried across.
    ///
    /// No format conversion: the two resources must be copy-compatible, which
    /// the dispatcher guarantees before routing here.  Repeating an identical
    /// copy with unchanged source data leaves the destination unchanged.
    ///
    /// A copy within one resource whose boxes overlap is unsupported: the row
    /// copy may observe rows it has already written.  Matches the original
    /// backend, which leaves overlapping copies undefined.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_region(
        &self,
        dst: &Arc<PixelResource>,
        dst_level: u8,
        dst_x: u32,
        dst_y: u32,
        dst_z: u32,
        src: &Arc<PixelResource>,
        src_level: u8,
        src_box: &Box3,
    ) -> Result<(), MapError> {
        assert_eq!(
            dst.format().block_size(),
            src.format().block_size(),
            "copy between incompatible block sizes"
        );

        let mut src_region = *src_box;
        if src.sample_count() > 1 {
            //sample planes are stored as depth slices; widen the box to carry
            //all of them
            src_region.depth = src.sample_count();
        }

        self.flush().flush_resource(
            dst,
            &FlushRequest {
                level: dst_level,
                read_only: false,
                cpu_access: true,
                do_not_block: false,
                reason: "blit dest",
            },
        );
        self.flush().flush_resource(
            src,
            &FlushRequest {
                level: src_level,
                read_only: true,
                cpu_access: true,
                do_not_block: false,
                reason: "blit src",
            },
        );

        let dst_region = Box3::new(
            dst_x,
            dst_y,
            dst_z,
            src_region.width,
            src_region.height,
            src_region.depth,
        );

        if Arc::ptr_eq(dst, src) {
            //one storage, one exclusive mapping; move rows within it
            let src_layout = src.transfer_layout(src_level, &src_region);
            let mut mapping = dst.map_write(dst_level, &dst_region)?;
            let row_bytes = src_layout.row_bytes;
            for z in 0..src_region.depth {
                for y in 0..src_region.height {
                    let from = src_layout.offset(z, y);
                    let to = mapping.layout().offset(z, y);
                    mapping.bytes_mut().copy_within(from..from + row_bytes, to);
                }
            }
        } else {
            let mut dst_map = dst.map_write(dst_level, &dst_region)?;
            let src_map = src.map_read(src_level, &src_region)?;
            for z in 0..src_region.depth {
                for y in 0..src_region.height {
                    dst_map.row_mut(z, y).copy_from_slice(src_map.row(z, y));
                }
            }
            //guards release source first, then destination
        }
        Ok(())
    }
}

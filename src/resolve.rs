// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The multisample resolve engine.
//!
//! Resolving downsamples a multisampled source into a single-sampled
//! destination by arithmetic mean.  Sample planes are stored as depth-like
//! slices [`sample_stride`](crate::resource::PixelResource::sample_stride)
//! bytes apart, and for the 8-bit-normalized formats this engine is scoped to,
//! averaging raw interleaved bytes is equivalent to averaging per channel, so
//! the loop never decodes channels at all.
//!
//! The average is computed in unit-float space (`u8 / 255.0`, round to nearest
//! on the way back).  This is the only place in the crate where float
//! conversion happens; using one consistent rule keeps repeated resolves from
//! drifting.

use crate::blit::BlitRequest;
use crate::context::SurfaceContext;
use crate::pixel_formats::{unit_to_unorm8, unorm8_to_unit};
use crate::transfer::{FlushRequest, MapError};

impl SurfaceContext {
    /// Averages every sample plane of the source box into the destination box.
    ///
    /// Only reached through the dispatcher, which guarantees a multisampled
    /// source, a single-sampled destination, and an interleaved
    /// 8-bit-normalized source format; violations are programming errors.
    ///
    /// The destination is mapped first (read-write) and the source second
    /// (read-only); both mappings are released on every exit path, source
    /// first, in strict reverse order of acquisition.
    pub(crate) fn resolve(&self, request: &BlitRequest) -> Result<(), MapError> {
        let src_resource = &request.src.resource;
        let dst_resource = &request.dst.resource;
        assert!(src_resource.sample_count() > 1 && dst_resource.sample_count() <= 1);
        let format = src_resource.format();
        assert!(!format.is_depth_or_stencil() && !format.is_pure_integer());
        assert!(
            format.is_unorm8(),
            "resolve averages 8-bit normalized components only, not {format:?}"
        );
        //sample planes are addressed by stride from plane zero
        assert_eq!(request.src.region.z, 0);

        self.flush().flush_resource(
            dst_resource,
            &FlushRequest {
                level: request.dst.level,
                read_only: false,
                cpu_access: true,
                do_not_block: false,
                reason: "resolve dest",
            },
        );
        self.flush().flush_resource(
            src_resource,
            &FlushRequest {
                level: request.src.level,
                read_only: true,
                cpu_access: true,
                do_not_block: false,
                reason: "resolve src",
            },
        );

        let sample_count = src_resource.sample_count();
        let sample_stride = src_resource.sample_stride();
        let inverse = 1.0 / sample_count as f32;

        //declaration order is the release contract: dst_map drops last
        let mut dst_map = dst_resource.map_write(request.dst.level, &request.dst.region)?;
        let src_map = src_resource.map_read(request.src.level, &request.src.region)?;

        let row_bytes = dst_map.layout().row_bytes;
        assert_eq!(row_bytes, src_map.layout().row_bytes);

        let region = request.dst.region;
        for z in 0..region.depth {
            for y in 0..region.height {
                let src_base = src_map.layout().offset(z, y);
                let src_bytes = src_map.bytes();
                let dst_row = dst_map.row_mut(z, y);
                for i in 0..row_bytes {
                    let mut sum = 0.0_f32;
                    for sample in 0..sample_count as usize {
                        sum +=
                            unorm8_to_unit(src_bytes[src_base + sample * sample_stride + i]);
                    }
                    dst_row[i] = unit_to_unorm8(sum * inverse);
                }
            }
        }
        Ok(())
    }
}

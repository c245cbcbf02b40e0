// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel resources: the storage that surfaces are views of.
//!
//! A [`PixelResource`] is either a texture (mip chain, layers, optional
//! multisampling) or a linear buffer.  This backend is software-only, so the
//! resource owns its pixel bytes directly; there is no device copy to keep in
//! sync.  Storage is laid out level-major, and within a level depth-slice
//! major, with the sample planes of a multisampled texture stored as
//! consecutive depth-like slices.  That layout is what makes the resolve
//! engine's `sample_stride` addressing and the copy engine's depth
//! reinterpretation work.
//!
//! Resources are shared by `Arc`: every surface created on a resource holds a
//! counted reference, and the storage is freed when the last reference drops.

use crate::blit::Box3;
use crate::pixel_formats::PixelFormat;
use crate::transfer::{
    MapError, MapTracker, TransferLayout, TransferReadMapping, TransferWriteMapping,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

bitflags::bitflags! {
    /// What a resource may be bound as.
    ///
    /// Surface creation requires `RENDER_TARGET` or `DEPTH_STENCIL`; see
    /// [`SurfaceDescriptor`](crate::surface::SurfaceDescriptor) for the repair
    /// policy applied when neither is present.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BindCapabilities: u32 {
        const RENDER_TARGET = 1 << 0;
        const DEPTH_STENCIL = 1 << 1;
        const SAMPLER_VIEW = 1 << 2;
    }
}

/// Texture-or-buffer discriminant, with the per-kind geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// 2D texture with a mip chain and array layers.
    Texture {
        /// Index of the smallest mip level.
        last_mip_level: u8,
        /// Array layer count, at least 1.
        layers: u32,
    },
    /// Linear buffer; `width0` is its byte width.
    Buffer,
}

/// Construction parameters for a texture resource.
#[derive(Debug, Clone, Copy)]
pub struct TextureSetup {
    pub format: PixelFormat,
    /// Base mip width in pixels.
    pub width: u32,
    /// Base mip height in pixels.
    pub height: u32,
    /// Index of the smallest mip level; 0 for no mip chain.
    pub last_mip_level: u8,
    /// Array layer count.
    pub layers: u32,
    /// Samples per pixel; 1, 2, 4, 8 or 16.
    pub sample_count: u32,
    pub bind: BindCapabilities,
    pub debug_name: &'static str,
}

/// Construction parameters for a buffer resource.
#[derive(Debug, Clone, Copy)]
pub struct BufferSetup {
    /// Byte width of the buffer.
    pub byte_width: u32,
    pub bind: BindCapabilities,
    pub debug_name: &'static str,
}

/// Pixel storage that surfaces view and blits operate on.
#[derive(Debug)]
pub struct PixelResource {
    format: PixelFormat,
    width0: u32,
    height0: u32,
    sample_count: u32,
    kind: ResourceKind,
    //atomic because the surface lifecycle manager repairs missing bind flags
    //on a resource that may already be shared
    bind: AtomicU32,
    level_offsets: Vec<usize>,
    storage: MapTracker,
    debug_name: &'static str,
}

const fn minify(dimension: u32, level: u8) -> u32 {
    let d = dimension >> level;
    if d == 0 { 1 } else { d }
}

impl PixelResource {
    /// Creates a texture resource with zero-initialized storage.
    ///
    /// Multisampled textures carry a single mip level and a single layer.
    pub fn new_texture(setup: TextureSetup) -> Arc<Self> {
        assert!(setup.width >= 1 && setup.height >= 1);
        assert!(setup.layers >= 1);
        assert!(
            matches!(setup.sample_count, 1 | 2 | 4 | 8 | 16),
            "unsupported sample count {}",
            setup.sample_count
        );
        assert!(
            setup.sample_count == 1 || (setup.last_mip_level == 0 && setup.layers == 1),
            "multisampled textures have one level and one layer"
        );
        let block = setup.format.block_size();
        let mut level_offsets = Vec::with_capacity(setup.last_mip_level as usize + 1);
        let mut total = 0_usize;
        for level in 0..=setup.last_mip_level {
            level_offsets.push(total);
            let width = minify(setup.width, level) as usize;
            let height = minify(setup.height, level) as usize;
            let slices = setup.layers as usize * setup.sample_count as usize;
            total += width * height * block * slices;
        }
        Arc::new(Self {
            format: setup.format,
            width0: setup.width,
            height0: setup.height,
            sample_count: setup.sample_count,
            kind: ResourceKind::Texture {
                last_mip_level: setup.last_mip_level,
                layers: setup.layers,
            },
            bind: AtomicU32::new(setup.bind.bits()),
            level_offsets,
            storage: MapTracker::new(total, setup.debug_name.to_owned()),
            debug_name: setup.debug_name,
        })
    }

    /// Creates a buffer resource with zero-initialized storage.
    ///
    /// Buffers are byte-addressed: their element format is single-byte, and a
    /// surface created on one may cast-view a wider format over the range.
    pub fn new_buffer(setup: BufferSetup) -> Arc<Self> {
        assert!(setup.byte_width >= 1);
        Arc::new(Self {
            format: PixelFormat::R8Unorm,
            width0: setup.byte_width,
            height0: 1,
            sample_count: 1,
            kind: ResourceKind::Buffer,
            bind: AtomicU32::new(setup.bind.bits()),
            level_offsets: vec![0],
            storage: MapTracker::new(setup.byte_width as usize, setup.debug_name.to_owned()),
            debug_name: setup.debug_name,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }
    /// Base mip width for textures; byte width for buffers.
    pub fn width0(&self) -> u32 {
        self.width0
    }
    pub fn height0(&self) -> u32 {
        self.height0
    }
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    pub fn is_texture(&self) -> bool {
        matches!(self.kind, ResourceKind::Texture { .. })
    }
    pub fn is_buffer(&self) -> bool {
        matches!(self.kind, ResourceKind::Buffer)
    }

    /// Index of the smallest mip level (0 for buffers).
    pub fn last_mip_level(&self) -> u8 {
        match self.kind {
            ResourceKind::Texture { last_mip_level, .. } => last_mip_level,
            ResourceKind::Buffer => 0,
        }
    }

    /// Array layer count (1 for buffers).
    pub fn layers(&self) -> u32 {
        match self.kind {
            ResourceKind::Texture { layers, .. } => layers,
            ResourceKind::Buffer => 1,
        }
    }

    /// Current bind capabilities.
    pub fn bind(&self) -> BindCapabilities {
        BindCapabilities::from_bits_truncate(self.bind.load(Ordering::Relaxed))
    }

    /// Adds bind capabilities; used by the surface lifecycle manager's
    /// documented repair of resources created without a renderable bind flag.
    pub(crate) fn add_bind(&self, capabilities: BindCapabilities) {
        self.bind.fetch_or(capabilities.bits(), Ordering::Relaxed);
    }

    /// Width of the given mip level, floored at 1.
    pub fn level_width(&self, level: u8) -> u32 {
        minify(self.width0, level)
    }

    /// Height of the given mip level, floored at 1.
    pub fn level_height(&self, level: u8) -> u32 {
        minify(self.height0, level)
    }

    /// Depth-like slices at a level: layers times sample planes.
    pub fn depth_planes(&self) -> u32 {
        self.layers() * self.sample_count
    }

    /// Bytes between consecutive sample planes of the same pixel region.
    ///
    /// Sample planes are stored as whole-plane slices, so the stride is the
    /// byte extent of one base-level plane.
    pub fn sample_stride(&self) -> usize {
        self.width0 as usize * self.height0 as usize * self.format.block_size()
    }

    /// Bytes between the starts of consecutive rows at a level.
    pub fn row_stride(&self, level: u8) -> usize {
        self.level_width(level) as usize * self.format.block_size()
    }

    /// Byte addressing for a box region of a level, validated against the
    /// level's bounds.  Box coordinates are in elements of the resource's own
    /// format; the z axis spans layers and sample planes.
    pub fn transfer_layout(&self, level: u8, region: &Box3) -> TransferLayout {
        assert!(level <= self.last_mip_level(), "level {level} out of range");
        let width = self.level_width(level);
        let height = self.level_height(level);
        assert!(
            region.x + region.width <= width && region.y + region.height <= height,
            "box exceeds level bounds"
        );
        assert!(
            region.z + region.depth <= self.depth_planes(),
            "box exceeds depth planes"
        );
        let block = self.format.block_size();
        let row_stride = width as usize * block;
        let slice_stride = height as usize * row_stride;
        let base = self.level_offsets[level as usize]
            + region.z as usize * slice_stride
            + region.y as usize * row_stride
            + region.x as usize * block;
        TransferLayout {
            base,
            row_bytes: region.width as usize * block,
            row_stride,
            slice_stride,
            rows: region.height,
            slices: region.depth,
        }
    }

    /// Maps a box region for reading.  The mapping is released when the guard
    /// drops.
    pub fn map_read(&self, level: u8, region: &Box3) -> Result<TransferReadMapping<'_>, MapError> {
        let layout = self.transfer_layout(level, region);
        let guard = self.storage.map_read()?;
        Ok(TransferReadMapping { guard, layout })
    }

    /// Maps a box region for read-write access.  Exclusive; released on drop.
    pub fn map_write(
        &self,
        level: u8,
        region: &Box3,
    ) -> Result<TransferWriteMapping<'_>, MapError> {
        let layout = self.transfer_layout(level, region);
        let guard = self.storage.map_write()?;
        Ok(TransferWriteMapping { guard, layout })
    }

    /// Total storage bytes, all levels and planes.
    pub fn byte_len(&self) -> usize {
        self.storage.byte_len()
    }
}

// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Surface descriptors: lightweight renderable views over a pixel resource.
//!
//! A surface is either a single mip level / layer range of a texture, or an
//! element range of a buffer.  It carries its own format, which may reinterpret
//! the resource's native format (a cast view), and holds a counted reference to
//! the resource for its whole lifetime.
//!
//! Creating a surface on a resource that was never given a renderable bind flag
//! does not fail: the missing capability is inferred from the requested format
//! and added to the resource, with a diagnostic.  This mutates the shared
//! resource, not just the new view; it is a deliberate leniency so that callers
//! that forgot a bind flag still render, and it is logged precisely because it
//! is surprising.

use crate::pixel_formats::PixelFormat;
use crate::resource::{BindCapabilities, PixelResource};
use std::sync::Arc;

/// The texture-or-buffer half of a surface view.
///
/// Consumers match exhaustively; there is no common-denominator accessor that
/// hides which kind a view is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceView {
    /// One mip level and an inclusive layer range of a texture.
    Texture {
        mip_level: u8,
        first_layer: u32,
        last_layer: u32,
    },
    /// An inclusive element range of a buffer, in elements of the surface's
    /// format.
    Buffer { first_element: u32, last_element: u32 },
}

/// What the caller asks for when creating a surface.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTemplate {
    /// Format of the view; may differ from the resource's native format.
    pub format: PixelFormat,
    pub view: SurfaceView,
}

/// A renderable view over one [`PixelResource`].
///
/// Holds an `Arc` reference to the resource; dropping the descriptor releases
/// it.  Cloning the descriptor shares the underlying resource reference, which
/// matches the original's refcounted surface semantics.
#[derive(Debug, Clone)]
pub struct SurfaceDescriptor {
    resource: Arc<PixelResource>,
    format: PixelFormat,
    sample_count: u32,
    width: u32,
    height: u32,
    view: SurfaceView,
}

impl SurfaceDescriptor {
    /// Creates a surface view on `resource` described by `template`.
    ///
    /// Dimensions are derived: mip-minified resource dimensions for texture
    /// views, element-range width (and resource height) for buffer views.  The
    /// sample count is copied from the resource at creation time.
    ///
    /// # Panics
    ///
    /// Malformed templates are caller programming errors, not runtime
    /// conditions: a texture view with `mip_level` past the resource's last
    /// level or `first_layer > last_layer`, a buffer view with
    /// `first_element > last_element` or a byte extent past the resource's
    /// width, or a view kind that does not match the resource kind.
    pub fn new(resource: &Arc<PixelResource>, template: &SurfaceTemplate) -> Self {
        if !resource
            .bind()
            .intersects(BindCapabilities::RENDER_TARGET | BindCapabilities::DEPTH_STENCIL)
        {
            logwise::warn_sync!(
                "Surface creation on {name} without a renderable bind flag; inferring one from {format}",
                name = resource.debug_name(),
                format = logwise::privacy::LogIt(template.format)
            );
            let inferred = if template.format.is_depth_or_stencil() {
                BindCapabilities::DEPTH_STENCIL
            } else {
                BindCapabilities::RENDER_TARGET
            };
            resource.add_bind(inferred);
        }

        let (width, height) = match template.view {
            SurfaceView::Texture {
                mip_level,
                first_layer,
                last_layer,
            } => {
                assert!(resource.is_texture(), "texture view on a buffer resource");
                assert!(mip_level <= resource.last_mip_level());
                assert!(first_layer <= last_layer);
                assert!(last_layer < resource.layers());
                (
                    resource.level_width(mip_level),
                    resource.level_height(mip_level),
                )
            }
            SurfaceView::Buffer {
                first_element,
                last_element,
            } => {
                assert!(resource.is_buffer(), "buffer view on a texture resource");
                assert!(first_element <= last_element);
                assert!(
                    template.format.block_size() * (last_element as usize + 1)
                        <= resource.width0() as usize,
                    "element range exceeds buffer byte width"
                );
                //width as number of elements gives the correct renderbuffer width
                (last_element - first_element + 1, resource.height0())
            }
        };

        Self {
            resource: resource.clone(),
            format: template.format,
            sample_count: resource.sample_count(),
            width,
            height,
            view: template.view,
        }
    }

    /// The resource this surface views.
    pub fn resource(&self) -> &Arc<PixelResource> {
        &self.resource
    }

    /// The view's format; may differ from the resource's native format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Sample count, copied from the resource at creation.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn view(&self) -> SurfaceView {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{BufferSetup, TextureSetup};

    #[test]
    #[should_panic]
    fn mip_level_out_of_range() {
        let resource = PixelResource::new_texture(TextureSetup {
            format: PixelFormat::Rgba8Unorm,
            width: 8,
            height: 8,
            last_mip_level: 1,
            layers: 1,
            sample_count: 1,
            bind: BindCapabilities::RENDER_TARGET,
            debug_name: "t",
        });
        SurfaceDescriptor::new(
            &resource,
            &SurfaceTemplate {
                format: PixelFormat::Rgba8Unorm,
                view: SurfaceView::Texture {
                    mip_level: 2,
                    first_layer: 0,
                    last_layer: 0,
                },
            },
        );
    }

    #[test]
    #[should_panic(expected = "element range exceeds buffer byte width")]
    fn buffer_range_out_of_bounds() {
        let resource = PixelResource::new_buffer(BufferSetup {
            byte_width: 16,
            bind: BindCapabilities::RENDER_TARGET,
            debug_name: "b",
        });
        //4 bytes per element, 5 elements => 20 bytes > 16
        SurfaceDescriptor::new(
            &resource,
            &SurfaceTemplate {
                format: PixelFormat::Rgba8Unorm,
                view: SurfaceView::Buffer {
                    first_element: 0,
                    last_element: 4,
                },
            },
        );
    }
}

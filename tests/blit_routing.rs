// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Dispatcher routing: each request must take the cheapest eligible path, and
//! only that path.

use std::sync::{Arc, Mutex};
use surfaces_and_samples::SurfaceContext;
use surfaces_and_samples::backend::{
    AlwaysRender, FallbackBlitter, NoPendingWork, RegionFill, RenderCondition,
    RenderConditionVerdict, SavedRenderState, StateHandle,
};
use surfaces_and_samples::blit::{BlitEnd, BlitRequest, Box3, FilterMode};
use surfaces_and_samples::clear::{ClearColor, ClearFlags};
use surfaces_and_samples::pixel_formats::PixelFormat;
use surfaces_and_samples::resource::{BindCapabilities, PixelResource, TextureSetup};
use surfaces_and_samples::surface::SurfaceDescriptor;

#[derive(Clone)]
struct SpyBlitter {
    supported: bool,
    events: Arc<Mutex<Vec<&'static str>>>,
    saved_vertex_shader: Arc<Mutex<Option<Option<StateHandle>>>>,
}

impl SpyBlitter {
    fn new(supported: bool) -> Self {
        Self {
            supported,
            events: Arc::new(Mutex::new(Vec::new())),
            saved_vertex_shader: Arc::new(Mutex::new(None)),
        }
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().expect("events lock").clone()
    }
}

impl FallbackBlitter for SpyBlitter {
    fn is_supported(&self, _request: &BlitRequest) -> bool {
        self.events.lock().expect("events lock").push("is_supported");
        self.supported
    }

    fn execute(&self, _request: &BlitRequest, saved: &SavedRenderState) {
        self.events.lock().expect("events lock").push("execute");
        *self.saved_vertex_shader.lock().expect("saved lock") = Some(saved.0.vertex_shader);
    }
}

struct SkipEverything;
impl RenderCondition for SkipEverything {
    fn evaluate(&self) -> RenderConditionVerdict {
        RenderConditionVerdict::Skip
    }
}

struct NoFill;
impl RegionFill for NoFill {
    fn clear_render_target(
        &self,
        _dst: &SurfaceDescriptor,
        _color: &ClearColor,
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) {
    }
    fn clear_depth_stencil(
        &self,
        _dst: &SurfaceDescriptor,
        _flags: ClearFlags,
        _depth: f64,
        _stencil: u32,
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) {
    }
}

fn context(blitter: &SpyBlitter, condition: Box<dyn RenderCondition>) -> SurfaceContext {
    SurfaceContext::new(
        Box::new(NoPendingWork),
        Box::new(blitter.clone()),
        Box::new(NoFill),
        condition,
    )
}

fn texture(
    name: &'static str,
    format: PixelFormat,
    sample_count: u32,
) -> Arc<PixelResource> {
    PixelResource::new_texture(TextureSetup {
        format,
        width: 4,
        height: 4,
        last_mip_level: 0,
        layers: 1,
        sample_count,
        bind: BindCapabilities::RENDER_TARGET,
        debug_name: name,
    })
}

/// Fills one depth/sample plane of a 4x4 level-0 texture with a byte value.
fn fill_plane(resource: &Arc<PixelResource>, plane: u32, value: u8) {
    let region = Box3::new(0, 0, plane, 4, 4, 1);
    let mut mapping = resource.map_write(0, &region).expect("map for fill");
    for y in 0..4 {
        mapping.row_mut(0, y).fill(value);
    }
}

fn plane_bytes(resource: &Arc<PixelResource>, plane: u32) -> Vec<u8> {
    let region = Box3::new(0, 0, plane, 4, 4, 1);
    let mapping = resource.map_read(0, &region).expect("map for read");
    let mut out = Vec::new();
    for y in 0..4 {
        out.extend_from_slice(mapping.row(0, y));
    }
    out
}

fn whole_request(
    src: &Arc<PixelResource>,
    dst: &Arc<PixelResource>,
    render_condition_enable: bool,
) -> BlitRequest {
    BlitRequest {
        src: BlitEnd {
            resource: src.clone(),
            level: 0,
            region: Box3::whole_2d(4, 4),
            format: src.format(),
        },
        dst: BlitEnd {
            resource: dst.clone(),
            level: 0,
            region: Box3::whole_2d(4, 4),
            format: dst.format(),
        },
        filter: FilterMode::Nearest,
        render_condition_enable,
    }
}

#[test]
fn render_condition_skip_has_no_side_effects() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 1);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);
    fill_plane(&src, 0, 0xaa);

    let blitter = SpyBlitter::new(true);
    let ctx = context(&blitter, Box::new(SkipEverything));
    ctx.blit(&whole_request(&src, &dst, true));

    assert!(plane_bytes(&dst, 0).iter().all(|&b| b == 0));
    assert!(blitter.events().is_empty());
}

#[test]
fn disabled_gate_ignores_render_condition() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 1);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);
    fill_plane(&src, 0, 0xaa);

    let blitter = SpyBlitter::new(true);
    let ctx = context(&blitter, Box::new(SkipEverything));
    ctx.blit(&whole_request(&src, &dst, false));

    assert!(plane_bytes(&dst, 0).iter().all(|&b| b == 0xaa));
}

#[test]
fn multisample_source_takes_resolve_path() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 4);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);
    //0x10 + 0x20 + 0x30 + 0x40 averages exactly to 0x28
    fill_plane(&src, 0, 0x10);
    fill_plane(&src, 1, 0x20);
    fill_plane(&src, 2, 0x30);
    fill_plane(&src, 3, 0x40);

    let blitter = SpyBlitter::new(true);
    let ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.blit(&whole_request(&src, &dst, false));

    assert!(plane_bytes(&dst, 0).iter().all(|&b| b == 0x28));
    assert!(
        blitter.events().is_empty(),
        "resolve must never consult the fallback blitter"
    );
}

#[test]
fn matching_request_takes_copy_path() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 1);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);
    fill_plane(&src, 0, 0x5c);

    let blitter = SpyBlitter::new(true);
    let ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.blit(&whole_request(&src, &dst, false));

    assert_eq!(plane_bytes(&dst, 0), plane_bytes(&src, 0));
    assert!(
        blitter.events().is_empty(),
        "copy-eligible requests must never consult the fallback blitter"
    );
}

#[test]
fn multisample_float_source_falls_back_to_blitter() {
    let src = texture("src", PixelFormat::Rgba32Float, 4);
    let dst = texture("dst", PixelFormat::Rgba32Float, 1);

    let blitter = SpyBlitter::new(true);
    let ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.blit(&whole_request(&src, &dst, false));

    //wide components cannot be byte-averaged, so this is the blitter's job
    assert_eq!(blitter.events(), vec!["is_supported", "execute"]);
}

#[test]
fn unsupported_multisample_wide_unorm_is_dropped() {
    let src = texture("src", PixelFormat::Rgba16Unorm, 4);
    let dst = texture("dst", PixelFormat::Rgba16Unorm, 1);
    fill_plane(&src, 0, 0x33);

    let blitter = SpyBlitter::new(false);
    let ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.blit(&whole_request(&src, &dst, false));

    assert_eq!(blitter.events(), vec!["is_supported"]);
    assert!(plane_bytes(&dst, 0).iter().all(|&b| b == 0));
}

fn scaled_request(src: &Arc<PixelResource>, dst: &Arc<PixelResource>) -> BlitRequest {
    BlitRequest {
        src: BlitEnd {
            resource: src.clone(),
            level: 0,
            region: Box3::new(0, 0, 0, 4, 4, 1),
            format: src.format(),
        },
        dst: BlitEnd {
            resource: dst.clone(),
            level: 0,
            region: Box3::new(0, 0, 0, 2, 2, 1),
            format: dst.format(),
        },
        filter: FilterMode::Linear,
        render_condition_enable: false,
    }
}

#[test]
fn unsupported_request_is_dropped_silently() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 1);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);
    fill_plane(&src, 0, 0x77);

    let blitter = SpyBlitter::new(false);
    let ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.blit(&scaled_request(&src, &dst));

    assert_eq!(blitter.events(), vec!["is_supported"]);
    assert!(
        plane_bytes(&dst, 0).iter().all(|&b| b == 0),
        "a dropped blit must leave the destination untouched"
    );
}

#[test]
fn generic_path_checkpoints_state_and_executes() {
    let src = texture("src", PixelFormat::Rgba8Unorm, 1);
    let dst = texture("dst", PixelFormat::Rgba8Unorm, 1);

    let blitter = SpyBlitter::new(true);
    let mut ctx = context(&blitter, Box::new(AlwaysRender));
    ctx.render_state_mut().vertex_shader = Some(7);

    ctx.blit(&scaled_request(&src, &dst));

    assert_eq!(blitter.events(), vec!["is_supported", "execute"]);
    assert_eq!(
        *blitter.saved_vertex_shader.lock().expect("saved lock"),
        Some(Some(7)),
        "the blitter must receive a snapshot of the live render state"
    );
}

/*! surfaces_and_samples is the surface and blit subsystem of a software-only
graphics backend.

It owns two jobs: the lifecycle of renderable *surfaces* (lightweight views
over pixel storage, either a mip level/layer range of a texture or an element
range of a buffer), and moving pixels between surfaces: region copies,
constant clears, and multisample resolves.  The rasterizer, shader pipeline
and generic triangle-based blitter live elsewhere and plug in through traits.

A blit request can ask for almost anything, so the dispatcher routes each one
through a strict priority order, cheapest strategy first:

| Priority | Strategy                     | Handles                                                   | Cost        |
|----------|------------------------------|-----------------------------------------------------------|-------------|
| 1        | render-condition skip        | gated requests the query machinery suppressed             | zero        |
| 2        | multisample resolve          | N-sample to 1-sample downsampling of averageable formats  | one pass    |
| 3        | region copy                  | same format, same geometry, no scaling                    | memcpy rows |
| 4        | logged drop                  | combinations the fallback blitter cannot emulate          | zero        |
| 5        | fallback rasterizing blitter | format conversion, scaling, flips                         | full draw   |

Everything is synchronous and single-threaded: operations run to completion
on the calling thread, and the only blocking happens inside CPU mappings.
Resources are shared by reference counting; concurrent mutation of one
resource is the caller's problem, but mapping misuse fails loudly rather than
tearing.

# Key types

- [`resource::PixelResource`]: the pixel storage, texture or buffer.
- [`surface::SurfaceDescriptor`]: a view over one resource.
- [`blit::BlitRequest`]: a transient blit description.
- [`context::SurfaceContext`]: the function table: create/destroy surface,
  blit, clears, region copy, sample-position query.
- [`backend`]: the traits an embedder implements to supply the fallback
  blitter, render condition, region fill and flush machinery.
*/

pub mod backend;
pub mod blit;
pub mod clear;
pub mod context;
pub mod pixel_formats;
mod resolve;
pub mod resource;
pub mod sample_positions;
pub mod surface;
pub mod transfer;

pub use context::SurfaceContext;

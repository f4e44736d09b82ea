//! WebGPU rendering module
//!
//! Uses SDF (Signed Distance Fields) for all rendering in the fragment shader.
//! The renderer only ever reads a `RenderSnapshot`.

pub mod sdf_pipeline;

pub use sdf_pipeline::{MAX_OBSTACLES, RendererError, SdfRenderState};

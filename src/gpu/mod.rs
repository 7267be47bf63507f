//! GPU resource management.
//!
//! Device and surface setup, the atlas texture, and the small bind-group
//! and pipeline helpers the card pass is assembled from.

/// Atlas texture upload and mip generation.
pub mod atlas_texture;
/// Bind-group layout entries, depth state and samplers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;

// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! A spherical item menu rendered with wgpu.
//!
//! Items are laid out on the vertices of a geodesic sphere and drawn as
//! thumbnail cards in one instanced draw call. The pointer spins the sphere
//! like a trackball; when released it coasts, slows down and snaps the
//! nearest item to face the viewer, which becomes the active item.
//!
//! # Key entry points
//!
//! - [`MenuRenderEngine`] - GPU engine: update, render, input, resize
//! - [`MenuCallbacks`] - active-item and movement notifications
//! - [`MenuOptions`] / [`MenuConfig`] - TOML-backed configuration
//! - [`engine::frame::MenuFrame`] - the GPU-free per-frame state
//! - `Viewer` (feature `viewer`) - a ready-made winit window
//!
//! # Architecture
//!
//! Thumbnails are fetched and composed into a square atlas on a background
//! [`atlas::AtlasBuilder`] thread; the frame loop polls for the finished
//! atlas and uploads it in one go. Until then cards sample a transparent
//! placeholder. Each frame the [`control::ArcballControl`] advances the
//! orientation, the frame state rebuilds every card transform, and the
//! whole instance buffer is written before the single draw.

pub mod atlas;
pub mod camera;
pub mod control;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod items;
pub mod options;
pub mod renderer;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::{EngineState, MenuCallbacks, MenuRenderEngine};
pub use error::MenuError;
pub use input::{InputEvent, MouseButton};
pub use items::MenuItem;
pub use options::{MenuConfig, MenuOptions};
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};

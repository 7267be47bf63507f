//! Render passes.
//!
//! The menu needs exactly one: [`disc_pass::DiscPass`] clears the target and
//! draws every card with a single instanced call.

/// Instanced card pipeline, buffers and uniforms.
pub mod disc_pass;

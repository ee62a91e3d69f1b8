//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the pipeline logic so route handlers can stay focused
//! on request normalization and response shaping.

pub mod pitch;
pub mod render;

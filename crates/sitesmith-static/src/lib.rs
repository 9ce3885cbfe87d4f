//! Static site builder for generated business websites.
//!
//! Writes each generated site together with a preview page and a generation
//! log, plus a shared index, assets and manifest.

pub mod assets;
pub mod builder;
pub mod report;
pub mod task;
pub mod templates;

pub use builder::{slugify, BuildConfig, BuildError, BuildResult, SiteSpec, StaticBuilder};
pub use task::{CancelHandle, GenerationTask, Progress, Stage};

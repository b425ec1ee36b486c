//! Structured output envelope and text rendering.

mod format;
mod model;
mod render;
mod result_builder;

pub use format::OutputFormat;
pub use model::*;
pub use render::TextRender;
pub use result_builder::{ResultBuilder, print_result, print_snapshot_line};

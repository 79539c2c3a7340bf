//! Printable calligraphy, graph and dot guideline pages.
//!
//! A [`grid::Grid`] is built from flat camelCase [`config::GridOptions`] and
//! rendered either into an element tree ([`svg::SvgNode`]) or straight into
//! SVG markup; both paths produce the same document.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod grid;
pub mod ids;
pub mod page;
pub mod render;
pub mod svg;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::GridOptions;
pub use error::GridError;
pub use grid::{Grid, GridKind, GridVariant};
pub use page::{GridPage, RenderedPage};

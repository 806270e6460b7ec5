//! Parallel feature drawing for cached vector layers.
//!
//! The [`RenderDispatcher`] draws each cached feature of a layer on a bounded
//! worker pool and reports completion through the layer. Related pieces:
//! - Styles and the registry that decodes them from records
//! - Per-feature style resolvers
//! - A `tiny-skia` raster target
//!
//! ```ignore
//! let dispatcher = RenderDispatcher::new(layer, RenderConfig::from_env())?
//!     .with_style(SimpleLineStyle::default());
//! dispatcher.run(Arc::new(PixmapTarget::new(512, 512, bounds)?))?;
//! ```

pub mod cancellation;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pixmap;
pub mod pool;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod style;
pub mod target;

pub use cancellation::{CancelOutcome, CancellationController};
pub use codec::{RendererRecord, RENDERER_NAME};
pub use config::RenderConfig;
pub use dispatcher::{RenderDispatcher, RunOutcome, VectorLayer};
pub use error::{RendererError, Result};
pub use pixmap::{PixmapTarget, PlacedLabel};
pub use progress::{Generation, ProgressCounter};
pub use registry::{StyleFactory, StyleRegistry};
pub use resolver::{CategoryColorResolver, SharedStyleResolver, StyleResolver};
pub use style::{
    SimpleLineStyle, SimpleMarkerStyle, SimplePolygonStyle, SimpleTextLineStyle,
    SimpleTextMarkerStyle, Style, StyleType,
};
pub use target::{DrawCommand, LineKind, MarkerShape, RenderTarget};

//! zinc-rs: scene filtering for 3D visualization.
//!
//! A [`Context`] owns a tree of [`Region`]s and a [`ScenefilterModule`].
//! Each [`Scene`] holds the graphics of one region and shows those passing
//! its scene filter.
//!
//! # Quick Start
//!
//! ```
//! use zinc::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!     let context = Context::new();
//!     let heart = context.root_region.create_child("heart")?;
//!
//!     let mut scene = context.create_scene(&heart)?;
//!     scene.create_graphics("surfaces", GraphicsType::Surfaces, DomainType::Mesh2d)?;
//!     scene.create_graphics("nodes", GraphicsType::Points, DomainType::Nodes)?;
//!
//!     // show everything visible except points
//!     let module = &context.scenefilter_module;
//!     let no_points = module.create_filter_graphics_type(GraphicsType::Points)?;
//!     no_points.set_inverse(true);
//!     let filter = module.create_filter_operator_and()?;
//!     filter.append_operand(&module.default_filter()?)?;
//!     filter.append_operand(&no_points)?;
//!     scene.set_filter(&filter);
//!
//!     let shown: Vec<&str> = scene.visible_graphics().into_iter().map(|g| g.name()).collect();
//!     assert_eq!(shown, ["surfaces"]);
//!     Ok(())
//! }
//! ```
//!
//! # Scene filters
//!
//! - Visibility flags, graphics name, graphics type, domain type and region
//!   filters test one property of a graphics
//! - AND/OR operator filters combine other filters; operands can be
//!   switched off without removing them
//! - Every filter can invert its result

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod context;
mod scene;

pub use context::Context;
pub use scene::{Scene, SceneGraphics};

// Re-export core types
pub use zinc_core::{
    error::{Result, ZincError},
    graphics::{DomainType, Graphics, GraphicsType},
    manager::{Manager, ManagerMessage, ObserverId},
    options::Options,
    region::Region,
    ManagerChange,
};

// Re-export scene filter types
pub use zinc_scenefilter::{
    Scenefilter, ScenefilterAttribute, ScenefilterModule, ScenefilterOperator, ScenefilterType,
};

/// Initializes logging from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

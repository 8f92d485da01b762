//! Scene filters for zinc-rs.
//!
//! A scene filter is a named predicate over graphics. Simple filters test one
//! property of a graphics (visibility flags, name, type, domain, region);
//! operator filters combine other filters with AND or OR, forming an acyclic
//! graph. Every filter can invert its result.
//!
//! Filters are created through a [`ScenefilterModule`], which names them,
//! owns them and tells observers when their results may have changed:
//!
//! ```
//! use zinc_scenefilter::ScenefilterModule;
//!
//! let module = ScenefilterModule::new();
//! let visible = module.default_filter().unwrap();
//! let hidden_lines = module.create_filter_operator_and().unwrap();
//! hidden_lines
//!     .append_operand(&module.create_filter_graphics_name("lines").unwrap())
//!     .unwrap();
//! hidden_lines.set_inverse(true);
//!
//! let scene_filter = module.create_filter_operator_and().unwrap();
//! scene_filter.append_operand(&visible).unwrap();
//! scene_filter.append_operand(&hidden_lines).unwrap();
//! assert_eq!(scene_filter.operand_count(), 2);
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute;
pub mod filter;
pub mod module;
pub mod operator;

#[cfg(test)]
pub(crate) mod test_support;

pub use attribute::ScenefilterAttribute;
pub use filter::{Scenefilter, ScenefilterType};
pub use module::ScenefilterModule;
pub use operator::ScenefilterOperator;

//! The context owning a region tree and its scene filters.

use zinc_core::{Options, Region, Result};
use zinc_scenefilter::ScenefilterModule;

use crate::scene::Scene;

/// Owns the root region and the scene filter module shared by all scenes.
pub struct Context {
    /// Root of the region tree.
    pub root_region: Region,

    /// Factory and registry for scene filters.
    pub scenefilter_module: ScenefilterModule,

    /// Options the context was created with.
    pub options: Options,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates a context with the given options.
    pub fn with_options(options: Options) -> Self {
        log::info!("zinc context created");
        Self {
            root_region: Region::new_root(),
            scenefilter_module: ScenefilterModule::with_options(options.clone()),
            options,
        }
    }

    /// Creates a scene for `region`, filtered by the default scene filter.
    pub fn create_scene(&self, region: &Region) -> Result<Scene> {
        Scene::new(&self.scenefilter_module, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_uses_options() {
        let context = Context::with_options(Options {
            default_scenefilter_name: "shown".to_string(),
            ..Options::default()
        });
        assert_eq!(context.root_region.path(), "/");
        let scene = context.create_scene(&context.root_region).unwrap();
        assert_eq!(scene.filter().name(), "shown");
        assert!(context.scenefilter_module.default_filter().unwrap().is_managed());
    }
}

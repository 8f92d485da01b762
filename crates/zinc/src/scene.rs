//! Scenes: the graphics of one region, shown through a scene filter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zinc_core::{
    DomainType, Graphics, GraphicsType, ManagerChange, ManagerMessage, ObserverId, Region, Result,
    ZincError,
};
use zinc_scenefilter::{Scenefilter, ScenefilterModule};

/// A graphics owned by a [`Scene`].
#[derive(Debug)]
pub struct SceneGraphics {
    name: String,
    graphics_type: GraphicsType,
    domain_type: DomainType,
    visibility_flag: bool,
    region: Region,
    scene_visibility: Rc<Cell<bool>>,
}

impl SceneGraphics {
    /// Sets the graphics' own visibility flag.
    pub fn set_visibility_flag(&mut self, visible: bool) {
        self.visibility_flag = visible;
    }
}

impl Graphics for SceneGraphics {
    fn name(&self) -> &str {
        &self.name
    }

    fn graphics_type(&self) -> GraphicsType {
        self.graphics_type
    }

    fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    fn visibility_flag(&self) -> bool {
        self.visibility_flag
    }

    fn region(&self) -> &Region {
        &self.region
    }

    fn scene_visibility_flag(&self) -> bool {
        self.scene_visibility.get()
    }
}

/// The graphics of one region together with the filter choosing which of
/// them are shown.
///
/// A scene watches its filter module and remembers when the result of its
/// current filter may have changed, so a renderer knows when to rebuild.
pub struct Scene {
    region: Region,
    module: ScenefilterModule,
    graphics: Vec<SceneGraphics>,
    visibility: Rc<Cell<bool>>,
    filter: Rc<RefCell<Scenefilter>>,
    filter_changed: Rc<Cell<bool>>,
    observer: ObserverId,
}

impl Scene {
    /// Creates an empty, visible scene for `region` using the module's
    /// default filter.
    pub fn new(module: &ScenefilterModule, region: &Region) -> Result<Self> {
        let filter = Rc::new(RefCell::new(module.default_filter()?));
        let filter_changed = Rc::new(Cell::new(false));

        let watched = Rc::clone(&filter);
        let changed = Rc::clone(&filter_changed);
        let observer = module
            .manager()
            .add_observer(move |message: &ManagerMessage<Scenefilter>| {
                let change = message.object_change(&watched.borrow());
                if change.intersects(ManagerChange::RESULT | ManagerChange::REMOVE) {
                    changed.set(true);
                }
            });
        log::debug!("created scene for region {}", region.path());

        Ok(Self {
            region: region.clone(),
            module: module.clone(),
            graphics: Vec::new(),
            visibility: Rc::new(Cell::new(true)),
            filter,
            filter_changed,
            observer,
        })
    }

    /// Returns the region this scene shows.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Returns whether the scene as a whole is visible.
    pub fn is_visible(&self) -> bool {
        self.visibility.get()
    }

    /// Shows or hides the whole scene.
    pub fn set_visible(&self, visible: bool) {
        if self.visibility.replace(visible) != visible {
            self.filter_changed.set(true);
        }
    }

    /// Adds a visible graphics to this scene.
    ///
    /// Fails with [`ZincError::NameInUse`] if the scene already has a
    /// graphics called `name`.
    pub fn create_graphics(
        &mut self,
        name: &str,
        graphics_type: GraphicsType,
        domain_type: DomainType,
    ) -> Result<&mut SceneGraphics> {
        zinc_core::error::validate_name(name)?;
        if self.find_graphics(name).is_some() {
            return Err(ZincError::NameInUse(name.to_string()));
        }
        self.graphics.push(SceneGraphics {
            name: name.to_string(),
            graphics_type,
            domain_type,
            visibility_flag: true,
            region: self.region.clone(),
            scene_visibility: Rc::clone(&self.visibility),
        });
        let index = self.graphics.len() - 1;
        Ok(&mut self.graphics[index])
    }

    /// Finds a graphics by name.
    pub fn find_graphics(&self, name: &str) -> Option<&SceneGraphics> {
        self.graphics.iter().find(|graphics| graphics.name == name)
    }

    /// Finds a graphics by name for modification.
    pub fn find_graphics_mut(&mut self, name: &str) -> Option<&mut SceneGraphics> {
        self.graphics.iter_mut().find(|graphics| graphics.name == name)
    }

    /// Returns all graphics in creation order.
    pub fn graphics(&self) -> &[SceneGraphics] {
        &self.graphics
    }

    /// Returns the graphics passing the scene filter, in creation order.
    pub fn visible_graphics(&self) -> Vec<&SceneGraphics> {
        let filter = self.filter.borrow();
        self.graphics
            .iter()
            .filter(|graphics| filter.evaluate_graphics(*graphics))
            .collect()
    }

    /// Returns the filter this scene is shown through.
    pub fn filter(&self) -> Scenefilter {
        self.filter.borrow().clone()
    }

    /// Shows this scene through `filter`.
    pub fn set_filter(&self, filter: &Scenefilter) {
        let previous = self.filter.replace(filter.clone());
        if previous != *filter {
            self.filter_changed.set(true);
        }
    }

    /// Goes back to the module's current default filter.
    pub fn reset_filter(&self) -> Result<()> {
        let default = self.module.default_filter()?;
        self.set_filter(&default);
        Ok(())
    }

    /// Returns true if the filter result may have changed since the last
    /// call, and clears the flag.
    pub fn take_filter_changed(&self) -> bool {
        self.filter_changed.replace(false)
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.module.manager().remove_observer(self.observer);
    }
}

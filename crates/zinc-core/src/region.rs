//! Region hierarchy.
//!
//! Regions form a tree. Graphics belong to exactly one region, and region
//! scene filters match graphics in a region or any of its descendants.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{validate_name, Result, ZincError};

struct RegionInner {
    name: String,
    parent: Option<Weak<RegionInner>>,
    children: RefCell<Vec<Region>>,
}

/// Shared handle to a node in the region tree.
///
/// Handles compare equal only if they refer to the same region.
#[derive(Clone)]
pub struct Region(Rc<RegionInner>);

impl Region {
    /// Creates a new root region with no parent.
    pub fn new_root() -> Self {
        Self(Rc::new(RegionInner {
            name: String::new(),
            parent: None,
            children: RefCell::new(Vec::new()),
        }))
    }

    /// Creates a child region with the given name.
    ///
    /// Names must be non-empty, must not contain `/`, and must be unique
    /// among siblings.
    pub fn create_child(&self, name: &str) -> Result<Region> {
        validate_name(name)?;
        if name.contains('/') {
            return Err(ZincError::InvalidName(name.to_string()));
        }
        if self.find_child(name).is_some() {
            return Err(ZincError::NameInUse(name.to_string()));
        }
        let child = Self(Rc::new(RegionInner {
            name: name.to_string(),
            parent: Some(Rc::downgrade(&self.0)),
            children: RefCell::new(Vec::new()),
        }));
        self.0.children.borrow_mut().push(child.clone());
        Ok(child)
    }

    /// Returns the name of this region. The root region has an empty name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the parent region, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Region> {
        self.0.parent.as_ref().and_then(Weak::upgrade).map(Region)
    }

    /// Returns the child regions in creation order.
    #[must_use]
    pub fn children(&self) -> Vec<Region> {
        self.0.children.borrow().clone()
    }

    /// Finds an immediate child by name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<Region> {
        self.0
            .children
            .borrow()
            .iter()
            .find(|child| child.name() == name)
            .cloned()
    }

    /// Finds a descendant by relative path such as `"heart/left"`.
    ///
    /// Empty segments are ignored, so `""` and `"/"` return this region.
    #[must_use]
    pub fn find_by_path(&self, path: &str) -> Option<Region> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.clone(), |region, segment| region.find_child(segment))
    }

    /// Returns the absolute path of this region, e.g. `"/heart/left"`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut names = Vec::new();
        let mut current = Some(self.clone());
        while let Some(region) = current {
            if region.0.parent.is_some() {
                names.push(region.name().to_string());
            }
            current = region.parent();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Returns true if this region is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Region) -> bool {
        let mut current = other.parent();
        while let Some(region) = current {
            if region == *self {
                return true;
            }
            current = region.parent();
        }
        false
    }

    /// Returns true if `other` is this region or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Region) -> bool {
        self == other || self.is_ancestor_of(other)
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Region {}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Region").field(&self.path()).finish()
    }
}

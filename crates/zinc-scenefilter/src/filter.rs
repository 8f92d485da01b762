//! Scene filters: named boolean predicates deciding which graphics are shown.
//!
//! A [`Scenefilter`] is a shared handle. Every holder (the owning module,
//! operator filters using it as an operand, scenes, client code) sees
//! configuration changes immediately.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use zinc_core::error::validate_name;
use zinc_core::{
    DomainType, Graphics, GraphicsType, ManagedObject, Manager, ManagerChange, Region, Result,
    WeakManager, ZincError,
};

use crate::operator::ScenefilterOperator;

/// The kind of test a scene filter performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenefilterType {
    /// Graphics and scene visibility flags are both set.
    VisibilityFlags,
    /// Graphics name equals a match name.
    GraphicsName,
    /// Graphics type equals a match type.
    GraphicsType,
    /// Graphics domain type equals a match domain type.
    DomainType,
    /// Graphics belongs to a region or one of its descendants.
    Region,
    /// All active operands match.
    OperatorAnd,
    /// Any active operand matches.
    OperatorOr,
}

impl ScenefilterType {
    /// Returns the canonical string for this filter type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VisibilityFlags => "VISIBILITY_FLAGS",
            Self::GraphicsName => "GRAPHICS_NAME",
            Self::GraphicsType => "GRAPHICS_TYPE",
            Self::DomainType => "DOMAIN_TYPE",
            Self::Region => "REGION",
            Self::OperatorAnd => "OPERATOR_AND",
            Self::OperatorOr => "OPERATOR_OR",
        }
    }

    /// Returns true for the AND/OR composite types.
    #[must_use]
    pub fn is_operator(self) -> bool {
        matches!(self, Self::OperatorAnd | Self::OperatorOr)
    }
}

impl fmt::Display for ScenefilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperatorKind {
    And,
    Or,
}

/// An operator filter's reference to one of its operands.
pub(crate) struct Operand {
    pub(crate) filter: Scenefilter,
    pub(crate) is_active: bool,
}

impl Operand {
    pub(crate) fn new(filter: Scenefilter) -> Self {
        Self {
            filter,
            is_active: true,
        }
    }
}

pub(crate) enum FilterKind {
    VisibilityFlags,
    GraphicsName(RefCell<String>),
    GraphicsType(Cell<GraphicsType>),
    DomainType(Cell<DomainType>),
    Region(RefCell<Region>),
    Operator {
        kind: OperatorKind,
        operands: RefCell<Vec<Operand>>,
    },
}

pub(crate) struct ScenefilterInner {
    name: RefCell<String>,
    inverse: Cell<bool>,
    managed: Cell<bool>,
    change_status: Cell<ManagerChange>,
    manager: RefCell<Option<WeakManager<Scenefilter>>>,
    pub(crate) kind: FilterKind,
}

/// Shared handle to a scene filter.
///
/// Handles compare equal only if they refer to the same filter.
#[derive(Clone)]
pub struct Scenefilter(pub(crate) Rc<ScenefilterInner>);

impl Scenefilter {
    pub(crate) fn new(name: String, kind: FilterKind) -> Self {
        Self(Rc::new(ScenefilterInner {
            name: RefCell::new(name),
            inverse: Cell::new(false),
            managed: Cell::new(false),
            change_status: Cell::new(ManagerChange::NONE),
            manager: RefCell::new(None),
            kind,
        }))
    }

    /// Returns the name of this filter.
    #[must_use]
    pub fn name(&self) -> String {
        self.0.name.borrow().clone()
    }

    /// Renames this filter.
    ///
    /// Fails with [`ZincError::NameInUse`] if another filter in the same
    /// module already has `name`; neither filter changes in that case.
    pub fn set_name(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        match self.manager() {
            Some(manager) => manager.rename(self, name),
            None => {
                *self.0.name.borrow_mut() = name.to_string();
                Ok(())
            }
        }
    }

    /// Returns the kind of test this filter performs.
    #[must_use]
    pub fn filter_type(&self) -> ScenefilterType {
        match &self.0.kind {
            FilterKind::VisibilityFlags => ScenefilterType::VisibilityFlags,
            FilterKind::GraphicsName(_) => ScenefilterType::GraphicsName,
            FilterKind::GraphicsType(_) => ScenefilterType::GraphicsType,
            FilterKind::DomainType(_) => ScenefilterType::DomainType,
            FilterKind::Region(_) => ScenefilterType::Region,
            FilterKind::Operator {
                kind: OperatorKind::And,
                ..
            } => ScenefilterType::OperatorAnd,
            FilterKind::Operator {
                kind: OperatorKind::Or,
                ..
            } => ScenefilterType::OperatorOr,
        }
    }

    /// Returns whether the match result is negated.
    #[must_use]
    pub fn is_inverse(&self) -> bool {
        self.0.inverse.get()
    }

    /// Sets whether the match result is negated.
    pub fn set_inverse(&self, inverse: bool) {
        if self.0.inverse.replace(inverse) != inverse {
            self.changed(ManagerChange::FULL_RESULT);
        }
    }

    /// Returns whether this filter persists in its module without outside
    /// references.
    #[must_use]
    pub fn is_managed(&self) -> bool {
        self.0.managed.get()
    }

    /// Sets whether this filter persists in its module without outside
    /// references.
    ///
    /// An unmanaged filter is removed from its module once only the module
    /// refers to it.
    pub fn set_managed(&self, managed: bool) {
        if self.0.managed.replace(managed) != managed {
            self.changed(ManagerChange::DEFINITION);
        }
    }

    /// Returns true if `graphics` passes this filter.
    pub fn evaluate_graphics(&self, graphics: &dyn Graphics) -> bool {
        let matched = match &self.0.kind {
            FilterKind::VisibilityFlags => graphics.is_visible_in_scene(),
            FilterKind::GraphicsName(match_name) => graphics.name() == match_name.borrow().as_str(),
            FilterKind::GraphicsType(graphics_type) => {
                graphics.graphics_type() == graphics_type.get()
            }
            FilterKind::DomainType(domain_type) => graphics.domain_type() == domain_type.get(),
            FilterKind::Region(region) => region.borrow().contains(graphics.region()),
            FilterKind::Operator { kind, operands } => {
                let operands = operands.borrow();
                let mut active = operands.iter().filter(|operand| operand.is_active);
                match kind {
                    OperatorKind::And => {
                        active.all(|operand| operand.filter.evaluate_graphics(graphics))
                    }
                    OperatorKind::Or => {
                        active.any(|operand| operand.filter.evaluate_graphics(graphics))
                    }
                }
            }
        };
        matched != self.is_inverse()
    }

    /// Returns the graphics name matched by a graphics name filter.
    #[must_use]
    pub fn match_name(&self) -> Option<String> {
        match &self.0.kind {
            FilterKind::GraphicsName(match_name) => Some(match_name.borrow().clone()),
            _ => None,
        }
    }

    /// Sets the graphics name matched by a graphics name filter.
    pub fn set_match_name(&self, match_name: &str) -> Result<()> {
        let FilterKind::GraphicsName(current) = &self.0.kind else {
            return Err(self.wrong_type("graphics name"));
        };
        if *current.borrow() != match_name {
            *current.borrow_mut() = match_name.to_string();
            self.changed(ManagerChange::FULL_RESULT);
        }
        Ok(())
    }

    /// Returns the graphics type matched by a graphics type filter.
    #[must_use]
    pub fn match_graphics_type(&self) -> Option<GraphicsType> {
        match &self.0.kind {
            FilterKind::GraphicsType(graphics_type) => Some(graphics_type.get()),
            _ => None,
        }
    }

    /// Sets the graphics type matched by a graphics type filter.
    pub fn set_match_graphics_type(&self, graphics_type: GraphicsType) -> Result<()> {
        let FilterKind::GraphicsType(current) = &self.0.kind else {
            return Err(self.wrong_type("graphics type"));
        };
        if current.replace(graphics_type) != graphics_type {
            self.changed(ManagerChange::FULL_RESULT);
        }
        Ok(())
    }

    /// Returns the domain type matched by a domain type filter.
    #[must_use]
    pub fn match_domain_type(&self) -> Option<DomainType> {
        match &self.0.kind {
            FilterKind::DomainType(domain_type) => Some(domain_type.get()),
            _ => None,
        }
    }

    /// Sets the domain type matched by a domain type filter.
    pub fn set_match_domain_type(&self, domain_type: DomainType) -> Result<()> {
        let FilterKind::DomainType(current) = &self.0.kind else {
            return Err(self.wrong_type("domain type"));
        };
        if current.replace(domain_type) != domain_type {
            self.changed(ManagerChange::FULL_RESULT);
        }
        Ok(())
    }

    /// Returns the region matched by a region filter.
    #[must_use]
    pub fn match_region(&self) -> Option<Region> {
        match &self.0.kind {
            FilterKind::Region(region) => Some(region.borrow().clone()),
            _ => None,
        }
    }

    /// Sets the region matched by a region filter.
    pub fn set_match_region(&self, region: &Region) -> Result<()> {
        let FilterKind::Region(current) = &self.0.kind else {
            return Err(self.wrong_type("region"));
        };
        if *current.borrow() != *region {
            *current.borrow_mut() = region.clone();
            self.changed(ManagerChange::FULL_RESULT);
        }
        Ok(())
    }

    /// Returns an operator handle if this is an AND or OR filter.
    #[must_use]
    pub fn as_operator(&self) -> Option<ScenefilterOperator> {
        ScenefilterOperator::from_filter(self)
    }

    /// Returns true if this filter is `other` or uses it, directly or
    /// through nested operators.
    #[must_use]
    pub fn depends_on_filter(&self, other: &Scenefilter) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match &self.0.kind {
            FilterKind::Operator { operands, .. } => operands
                .borrow()
                .iter()
                .any(|operand| operand.filter.depends_on_filter(other)),
            _ => false,
        }
    }

    /// Returns true if this filter's result changed in the current change
    /// batch.
    ///
    /// Operator filters also ask their operands, and on finding a changed
    /// one record a result change on themselves so later calls in the same
    /// batch return immediately.
    pub fn check_dependency(&self) -> bool {
        if self.0.change_status.get().intersects(ManagerChange::RESULT) {
            return true;
        }
        if let FilterKind::Operator { operands, .. } = &self.0.kind {
            let operand_changed = operands
                .borrow()
                .iter()
                .any(|operand| operand.filter.check_dependency());
            if operand_changed {
                if let Some(manager) = self.manager() {
                    manager.note_change(self, ManagerChange::FULL_RESULT);
                }
                return true;
            }
        }
        false
    }

    /// Returns true if both handles refer to the same filter.
    #[must_use]
    pub fn ptr_eq(&self, other: &Scenefilter) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns true if this filter is registered with a module.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.manager().is_some()
    }

    pub(crate) fn manager(&self) -> Option<Manager<Scenefilter>> {
        self.0.manager.borrow().as_ref().and_then(WeakManager::upgrade)
    }

    /// Reports a change to the owning manager, if any.
    pub(crate) fn changed(&self, change: ManagerChange) {
        if let Some(manager) = self.manager() {
            manager.object_changed(self, change);
        }
    }

    fn wrong_type(&self, expected: &'static str) -> ZincError {
        ZincError::WrongFilterType {
            name: self.name(),
            expected,
        }
    }
}

impl ManagedObject for Scenefilter {
    fn identifier(&self) -> String {
        self.name()
    }

    fn set_identifier(&self, identifier: &str) {
        *self.0.name.borrow_mut() = identifier.to_string();
    }

    fn same_object(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }

    fn change_status(&self) -> ManagerChange {
        self.0.change_status.get()
    }

    fn set_change_status(&self, status: ManagerChange) {
        self.0.change_status.set(status);
    }

    fn is_managed(&self) -> bool {
        Scenefilter::is_managed(self)
    }

    fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    fn set_manager(&self, manager: Option<WeakManager<Self>>) {
        *self.0.manager.borrow_mut() = manager;
    }

    fn check_dependency(&self) -> bool {
        Scenefilter::check_dependency(self)
    }
}

impl PartialEq for Scenefilter {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Scenefilter {}

impl fmt::Debug for Scenefilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenefilter")
            .field("name", &self.name())
            .field("type", &self.filter_type())
            .field("inverse", &self.is_inverse())
            .field("managed", &self.is_managed())
            .finish()
    }
}

/// One-line description in the style of the `list` command, e.g.
/// `"temp3 operator_and add_filters temp1 temp2 inverse"`.
impl fmt::Display for Scenefilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.name())?;
        match &self.0.kind {
            FilterKind::VisibilityFlags => f.write_str("match_visibility_flags")?,
            FilterKind::GraphicsName(match_name) => {
                write!(f, "match_graphics_name {}", match_name.borrow())?;
            }
            FilterKind::GraphicsType(graphics_type) => {
                write!(f, "graphics_type {}", graphics_type.get())?;
            }
            FilterKind::DomainType(domain_type) => {
                write!(f, "domain_type {}", domain_type.get())?;
            }
            FilterKind::Region(region) => {
                write!(f, "match_region_path {}", region.borrow().path())?;
            }
            FilterKind::Operator { kind, operands } => {
                f.write_str(match kind {
                    OperatorKind::And => "operator_and",
                    OperatorKind::Or => "operator_or",
                })?;
                let operands = operands.borrow();
                if !operands.is_empty() {
                    f.write_str(" add_filters")?;
                    for operand in operands.iter() {
                        write!(f, " {}", operand.filter.name())?;
                        if !operand.is_active {
                            f.write_str("(inactive)")?;
                        }
                    }
                }
            }
        }
        if self.is_inverse() {
            f.write_str(" inverse")?;
        }
        Ok(())
    }
}

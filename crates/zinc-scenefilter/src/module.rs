//! Scene filter module: factory and named registry for a context's filters.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zinc_core::{
    DomainType, GraphicsType, ManagedObject, Manager, Options, Region, Result, ZincError,
};

use crate::filter::{FilterKind, OperatorKind, Scenefilter};
use crate::operator::ScenefilterOperator;

struct ModuleInner {
    manager: Manager<Scenefilter>,
    default_filter: RefCell<Option<Scenefilter>>,
    options: Options,
}

/// Creates, names and owns the scene filters of one context.
///
/// New filters get a unique temporary name (`temp1`, `temp2`, ...) and are
/// unmanaged: they are removed from the module once nothing else refers to
/// them, unless [`Scenefilter::set_managed`] is called.
#[derive(Clone)]
pub struct ScenefilterModule(Rc<ModuleInner>);

impl Default for ScenefilterModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenefilterModule {
    /// Creates an empty module with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates an empty module using the naming options given.
    pub fn with_options(options: Options) -> Self {
        Self(Rc::new(ModuleInner {
            manager: Manager::new(),
            default_filter: RefCell::new(None),
            options,
        }))
    }

    /// Returns the options this module was created with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.0.options
    }

    /// Returns the manager holding this module's filters.
    ///
    /// Use it to observe filter changes.
    #[must_use]
    pub fn manager(&self) -> &Manager<Scenefilter> {
        &self.0.manager
    }

    /// Starts batching change messages. Calls nest.
    pub fn begin_change(&self) {
        self.0.manager.begin_cache();
    }

    /// Ends batching; the outermost call sends one message for all changes.
    pub fn end_change(&self) -> Result<()> {
        self.0.manager.end_cache()
    }

    /// Creates a filter matching graphics whose own and scene visibility
    /// flags are both set.
    pub fn create_filter_visibility_flags(&self) -> Result<Scenefilter> {
        self.create_filter(FilterKind::VisibilityFlags)
    }

    /// Creates a filter matching graphics by exact name.
    pub fn create_filter_graphics_name(&self, match_name: &str) -> Result<Scenefilter> {
        self.create_filter(FilterKind::GraphicsName(RefCell::new(
            match_name.to_string(),
        )))
    }

    /// Creates a filter matching graphics of one type.
    pub fn create_filter_graphics_type(&self, graphics_type: GraphicsType) -> Result<Scenefilter> {
        self.create_filter(FilterKind::GraphicsType(Cell::new(graphics_type)))
    }

    /// Creates a filter matching graphics over one field domain type.
    pub fn create_filter_domain_type(&self, domain_type: DomainType) -> Result<Scenefilter> {
        self.create_filter(FilterKind::DomainType(Cell::new(domain_type)))
    }

    /// Creates a filter matching graphics in `region` or its descendants.
    pub fn create_filter_region(&self, region: &Region) -> Result<Scenefilter> {
        self.create_filter(FilterKind::Region(RefCell::new(region.clone())))
    }

    /// Creates an operator filter matching when all active operands match.
    pub fn create_filter_operator_and(&self) -> Result<ScenefilterOperator> {
        self.create_operator(OperatorKind::And)
    }

    /// Creates an operator filter matching when any active operand matches.
    pub fn create_filter_operator_or(&self) -> Result<ScenefilterOperator> {
        self.create_operator(OperatorKind::Or)
    }

    /// Finds a filter by exact name.
    #[must_use]
    pub fn find_filter_by_name(&self, name: &str) -> Option<Scenefilter> {
        self.0.manager.find_by_identifier(name)
    }

    /// Returns the default filter, creating it on first use.
    ///
    /// If none has been set, an existing filter with the configured default
    /// name (`"default"`) is used; otherwise a visibility flags filter with
    /// that name is created. Either way it becomes managed and is stored as
    /// the default, so later calls return the same filter.
    pub fn default_filter(&self) -> Result<Scenefilter> {
        let current = self.0.default_filter.borrow().clone();
        if let Some(filter) = current {
            return Ok(filter);
        }
        let name = self.0.options.default_scenefilter_name.as_str();
        let filter = match self.find_filter_by_name(name) {
            Some(filter) => filter,
            None => {
                self.begin_change();
                let created = self.create_filter_visibility_flags().and_then(|filter| {
                    filter.set_name(name)?;
                    filter.set_managed(true);
                    Ok(filter)
                });
                self.end_change()?;
                let created = created?;
                log::info!("created default scene filter '{name}'");
                created
            }
        };
        filter.set_managed(true);
        self.set_default_filter(&filter);
        Ok(filter)
    }

    /// Replaces the stored default filter.
    ///
    /// The filter's managed flag and registration are left unchanged.
    pub fn set_default_filter(&self, filter: &Scenefilter) {
        *self.0.default_filter.borrow_mut() = Some(filter.clone());
    }

    /// Forgets the stored default filter; the next
    /// [`default_filter`](Self::default_filter) call looks it up again.
    pub fn clear_default_filter(&self) {
        self.0.default_filter.borrow_mut().take();
    }

    /// Removes a filter from this module.
    ///
    /// Fails with [`ZincError::ObjectInUse`] if anything other than the
    /// module and the caller's handle refers to it, such as an operator
    /// filter, a scene or the default filter slot.
    pub fn remove_filter(&self, filter: &Scenefilter) -> Result<()> {
        if !self.0.manager.contains(filter) {
            return Err(ZincError::NotInManager(filter.name()));
        }
        if filter.reference_count() > self.0.manager.held_reference_count(filter) + 1 {
            return Err(ZincError::ObjectInUse(filter.name()));
        }
        self.0.manager.remove(filter)
    }

    /// Returns all filters in name order.
    #[must_use]
    pub fn filters(&self) -> Vec<Scenefilter> {
        self.0.manager.objects()
    }

    /// Returns the number of filters in this module.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.manager.len()
    }

    /// Returns true if this module holds no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.manager.is_empty()
    }

    /// Removes unmanaged filters nothing else refers to.
    pub fn purge_unreferenced(&self) -> usize {
        self.0.manager.purge_unreferenced()
    }

    /// Describes every filter, one line each, in name order.
    pub fn list_filters(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .filters()
            .iter()
            .map(ToString::to_string)
            .collect();
        for line in &lines {
            log::info!("scene filter {line}");
        }
        lines
    }

    fn create_operator(&self, kind: OperatorKind) -> Result<ScenefilterOperator> {
        let filter = self.create_filter(FilterKind::Operator {
            kind,
            operands: RefCell::new(Vec::new()),
        })?;
        filter
            .as_operator()
            .ok_or_else(|| ZincError::WrongFilterType {
                name: filter.name(),
                expected: "AND or OR",
            })
    }

    fn create_filter(&self, kind: FilterKind) -> Result<Scenefilter> {
        let filter = Scenefilter::new(self.temporary_name(), kind);
        self.0.manager.add(&filter)?;
        log::debug!(
            "created {} scene filter '{}'",
            filter.filter_type(),
            filter.name()
        );
        Ok(filter)
    }

    /// Returns `temp<N>` for the smallest unused N above the filter count.
    fn temporary_name(&self) -> String {
        let prefix = &self.0.options.temporary_name_prefix;
        let mut index = self.0.manager.len();
        loop {
            index += 1;
            let name = format!("{prefix}{index}");
            if self.0.manager.find_by_identifier(&name).is_none() {
                return name;
            }
        }
    }
}

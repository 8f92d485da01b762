//! Generic object manager with batched change notification.
//!
//! A [`Manager`] keeps a name-indexed set of shared objects and tells its
//! observers what changed. Changes are recorded on the objects themselves
//! (see [`ManagerChange`]) and sent as a single [`ManagerMessage`] when the
//! outermost `begin_cache`/`end_cache` pair closes, or immediately if no
//! cache is open.
//!
//! Before each message is built, every live object gets a chance to notice
//! that something it depends on has changed via
//! [`ManagedObject::check_dependency`]. After each message, objects that are
//! not flagged as managed and are referenced only by the manager are removed.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::change::ManagerChange;
use crate::error::{validate_name, Result, ZincError};

/// An object that can be owned by a [`Manager`].
///
/// Implementors are cheap shared handles; cloning must not copy the object.
pub trait ManagedObject: Clone {
    /// Returns the identifier the object is indexed by.
    fn identifier(&self) -> String;

    /// Stores a new identifier on the object without touching any index.
    ///
    /// Only [`Manager::rename`] may call this for an object in a manager.
    fn set_identifier(&self, identifier: &str);

    /// Returns true if both handles refer to the same object.
    fn same_object(&self, other: &Self) -> bool;

    /// Returns the changes recorded since the last manager update.
    fn change_status(&self) -> ManagerChange;

    /// Overwrites the recorded changes.
    fn set_change_status(&self, status: ManagerChange);

    /// Returns true if the object should persist without outside references.
    fn is_managed(&self) -> bool;

    /// Returns the number of live handles to the object, including the
    /// manager's own.
    fn reference_count(&self) -> usize;

    /// Records the manager owning this object, or clears it on removal.
    fn set_manager(&self, manager: Option<WeakManager<Self>>);

    /// Returns true if this object's result changed in the current batch.
    ///
    /// Objects depending on other objects override this to mark themselves
    /// changed when a dependency has changed.
    fn check_dependency(&self) -> bool {
        self.change_status().intersects(ManagerChange::RESULT)
    }
}

/// Identifies an observer registered with [`Manager::add_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Summary of the changes made to a manager's objects in one batch.
pub struct ManagerMessage<T> {
    summary: ManagerChange,
    changes: Vec<(T, ManagerChange)>,
}

impl<T: ManagedObject> ManagerMessage<T> {
    /// Returns the union of all object changes in this message.
    #[must_use]
    pub fn change_summary(&self) -> ManagerChange {
        self.summary
    }

    /// Returns the change recorded for `object`, or `NONE` if it is absent.
    #[must_use]
    pub fn object_change(&self, object: &T) -> ManagerChange {
        self.changes
            .iter()
            .find(|(changed, _)| changed.same_object(object))
            .map_or(ManagerChange::NONE, |(_, change)| *change)
    }

    /// Returns each changed object with its change flags.
    pub fn changes(&self) -> impl Iterator<Item = (&T, ManagerChange)> {
        self.changes.iter().map(|(object, change)| (object, *change))
    }

    /// Returns the number of objects in this message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if the message lists no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

type Observer<T> = Rc<RefCell<dyn FnMut(&ManagerMessage<T>)>>;

struct ManagerState<T> {
    objects: BTreeMap<String, T>,
    /// Added or changed objects awaiting the next message.
    changed: Vec<T>,
    /// Removed objects, kept separately so a new object may reuse the name.
    removed: Vec<T>,
    observers: Vec<(ObserverId, Observer<T>)>,
    /// Message currently being delivered to observers.
    dispatching: Option<Rc<ManagerMessage<T>>>,
    next_observer_id: u64,
    cache: u32,
    updating: bool,
}

/// Shared handle to a name-indexed set of managed objects.
pub struct Manager<T: ManagedObject>(Rc<RefCell<ManagerState<T>>>);

impl<T: ManagedObject> Clone for Manager<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: ManagedObject> Default for Manager<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-owning handle to a [`Manager`], held by its objects.
pub struct WeakManager<T: ManagedObject>(Weak<RefCell<ManagerState<T>>>);

impl<T: ManagedObject> Clone for WeakManager<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T: ManagedObject> WeakManager<T> {
    /// Returns the manager if it still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<Manager<T>> {
        self.0.upgrade().map(Manager)
    }
}

impl<T: ManagedObject> Manager<T> {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ManagerState {
            objects: BTreeMap::new(),
            changed: Vec::new(),
            removed: Vec::new(),
            observers: Vec::new(),
            dispatching: None,
            next_observer_id: 0,
            cache: 0,
            updating: false,
        })))
    }

    /// Returns a non-owning handle to this manager.
    #[must_use]
    pub fn downgrade(&self) -> WeakManager<T> {
        WeakManager(Rc::downgrade(&self.0))
    }

    /// Returns true if both handles refer to the same manager.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Adds an object under its current identifier.
    pub fn add(&self, object: &T) -> Result<()> {
        let identifier = object.identifier();
        {
            let mut state = self.0.borrow_mut();
            if state.objects.contains_key(&identifier) {
                return Err(ZincError::NameInUse(identifier));
            }
            state.objects.insert(identifier, object.clone());
            state.removed.retain(|removed| !removed.same_object(object));
            state.changed.retain(|changed| !changed.same_object(object));
            state.changed.push(object.clone());
        }
        object.set_change_status(ManagerChange::ADD);
        object.set_manager(Some(self.downgrade()));
        self.update_if_not_caching();
        Ok(())
    }

    /// Removes an object from the manager.
    pub fn remove(&self, object: &T) -> Result<()> {
        let identifier = object.identifier();
        {
            let mut state = self.0.borrow_mut();
            match state.objects.get(&identifier) {
                Some(existing) if existing.same_object(object) => {}
                _ => return Err(ZincError::NotInManager(identifier)),
            }
            let removed = state.objects.remove(&identifier);
            state.changed.retain(|changed| !changed.same_object(object));
            state.removed.extend(removed);
        }
        object.set_change_status(ManagerChange::REMOVE);
        object.set_manager(None);
        self.update_if_not_caching();
        Ok(())
    }

    /// Changes the identifier of an object, keeping the index consistent.
    ///
    /// Fails without changing anything if another object already uses
    /// `identifier`. Renaming to the current identifier is a no-op.
    pub fn rename(&self, object: &T, identifier: &str) -> Result<()> {
        validate_name(identifier)?;
        let old_identifier = object.identifier();
        if old_identifier == identifier {
            return Ok(());
        }
        {
            let mut state = self.0.borrow_mut();
            if state.objects.contains_key(identifier) {
                return Err(ZincError::NameInUse(identifier.to_string()));
            }
            match state.objects.get(&old_identifier) {
                Some(existing) if existing.same_object(object) => {}
                _ => return Err(ZincError::NotInManager(old_identifier)),
            }
            // remove, re-key, reinsert
            if let Some(entry) = state.objects.remove(&old_identifier) {
                entry.set_identifier(identifier);
                state.objects.insert(identifier.to_string(), entry);
            }
        }
        log::debug!("renamed '{old_identifier}' to '{identifier}'");
        self.object_changed(object, ManagerChange::IDENTIFIER);
        Ok(())
    }

    /// Finds an object by identifier.
    #[must_use]
    pub fn find_by_identifier(&self, identifier: &str) -> Option<T> {
        self.0.borrow().objects.get(identifier).cloned()
    }

    /// Returns true if `object` is in this manager.
    #[must_use]
    pub fn contains(&self, object: &T) -> bool {
        self.0
            .borrow()
            .objects
            .get(&object.identifier())
            .is_some_and(|existing| existing.same_object(object))
    }

    /// Returns how many handles to `object` the manager itself holds: its
    /// registry entry plus any pending or in-flight change records.
    ///
    /// An object is referenced from outside the manager exactly when its
    /// [`ManagedObject::reference_count`] exceeds this.
    #[must_use]
    pub fn held_reference_count(&self, object: &T) -> usize {
        held_by(&*self.0.borrow(), object)
    }

    /// Returns all objects in identifier order.
    #[must_use]
    pub fn objects(&self) -> Vec<T> {
        self.0.borrow().objects.values().cloned().collect()
    }

    /// Returns the number of objects in the manager.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().objects.len()
    }

    /// Returns true if the manager holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().objects.is_empty()
    }

    /// Records a change to `object` and sends a message unless caching.
    pub fn object_changed(&self, object: &T, change: ManagerChange) {
        self.note_change(object, change);
        self.update_if_not_caching();
    }

    /// Records a change to `object` without sending a message.
    ///
    /// Used while checking dependencies, where the message is already being
    /// assembled.
    pub fn note_change(&self, object: &T, change: ManagerChange) {
        let status = object.change_status();
        // changes to a newly added object are part of the add
        if status.contains(ManagerChange::ADD) {
            return;
        }
        if status.is_none() {
            self.0.borrow_mut().changed.push(object.clone());
        }
        object.set_change_status(status | change);
    }

    /// Starts caching changes. Calls nest.
    pub fn begin_cache(&self) {
        self.0.borrow_mut().cache += 1;
    }

    /// Stops caching changes, sending one message when the outermost cache
    /// closes.
    pub fn end_cache(&self) -> Result<()> {
        let level = {
            let mut state = self.0.borrow_mut();
            if state.cache == 0 {
                return Err(ZincError::CacheNotEnabled);
            }
            state.cache -= 1;
            state.cache
        };
        if level == 0 {
            self.update();
        }
        Ok(())
    }

    /// Returns the current cache nesting depth.
    #[must_use]
    pub fn cache_level(&self) -> u32 {
        self.0.borrow().cache
    }

    /// Registers a callback receiving every change message.
    pub fn add_observer<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&ManagerMessage<T>) + 'static,
    {
        let mut state = self.0.borrow_mut();
        let id = ObserverId(state.next_observer_id);
        state.next_observer_id += 1;
        let observer: Observer<T> = Rc::new(RefCell::new(callback));
        state.observers.push((id, observer));
        id
    }

    /// Unregisters an observer. Returns false if it was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut state = self.0.borrow_mut();
        let before = state.observers.len();
        state.observers.retain(|(observer_id, _)| *observer_id != id);
        state.observers.len() != before
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.0.borrow().observers.len()
    }

    /// Removes unmanaged objects referenced only by this manager.
    ///
    /// Returns the number of objects removed by the first pass; objects
    /// released as a consequence are removed by the message flush that
    /// follows, unless caching.
    pub fn purge_unreferenced(&self) -> usize {
        let count = self.sweep_unreferenced();
        self.update_if_not_caching();
        count
    }

    fn update_if_not_caching(&self) {
        if self.cache_level() == 0 {
            self.update();
        }
    }

    fn has_pending_changes(&self) -> bool {
        let state = self.0.borrow();
        !(state.changed.is_empty() && state.removed.is_empty())
    }

    fn update(&self) {
        {
            let mut state = self.0.borrow_mut();
            if state.updating {
                return;
            }
            state.updating = true;
        }
        loop {
            if !self.has_pending_changes() && self.sweep_unreferenced() == 0 {
                break;
            }
            self.update_dependencies();
            self.send_message();
        }
        self.0.borrow_mut().updating = false;
    }

    fn update_dependencies(&self) {
        let objects = self.objects();
        for object in &objects {
            object.check_dependency();
        }
    }

    fn send_message(&self) {
        let (message, observers) = {
            let mut state = self.0.borrow_mut();
            let changed = std::mem::take(&mut state.changed);
            let removed = std::mem::take(&mut state.removed);
            let mut message = ManagerMessage {
                summary: ManagerChange::NONE,
                changes: Vec::with_capacity(changed.len() + removed.len()),
            };
            for object in changed.into_iter().chain(removed) {
                let status = object.change_status();
                object.set_change_status(ManagerChange::NONE);
                message.summary |= status;
                message.changes.push((object, status));
            }
            let observers: Vec<Observer<T>> = state
                .observers
                .iter()
                .map(|(_, observer)| Rc::clone(observer))
                .collect();
            let message = Rc::new(message);
            state.dispatching = Some(Rc::clone(&message));
            (message, observers)
        };
        log::debug!(
            "manager update: {} object(s), summary {:?}",
            message.len(),
            message.change_summary()
        );
        for observer in observers {
            let mut callback = observer.borrow_mut();
            (*callback)(&*message);
        }
        self.0.borrow_mut().dispatching = None;
    }

    fn sweep_unreferenced(&self) -> usize {
        let state = self.0.borrow();
        let unreferenced: Vec<String> = state
            .objects
            .iter()
            .filter(|&(_, object)| {
                !object.is_managed() && object.reference_count() == held_by(&*state, object)
            })
            .map(|(identifier, _)| identifier.clone())
            .collect();
        drop(state);
        for identifier in &unreferenced {
            let removed = self.0.borrow_mut().objects.remove(identifier);
            if let Some(object) = removed {
                log::debug!("removing unreferenced object '{identifier}'");
                object.set_change_status(ManagerChange::REMOVE);
                object.set_manager(None);
                let mut state = self.0.borrow_mut();
                state.changed.retain(|changed| !changed.same_object(&object));
                state.removed.push(object);
            }
        }
        unreferenced.len()
    }
}

fn held_by<T: ManagedObject>(state: &ManagerState<T>, object: &T) -> usize {
    let registered = state
        .objects
        .get(&object.identifier())
        .is_some_and(|existing| existing.same_object(object));
    let pending = state
        .changed
        .iter()
        .chain(&state.removed)
        .filter(|pending| pending.same_object(object))
        .count();
    let in_flight = state.dispatching.as_ref().map_or(0, |message| {
        message
            .changes
            .iter()
            .filter(|(changed, _)| changed.same_object(object))
            .count()
    });
    usize::from(registered) + pending + in_flight
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Inner {
        name: RefCell<String>,
        status: Cell<ManagerChange>,
        managed: Cell<bool>,
        manager: RefCell<Option<WeakManager<Item>>>,
    }

    #[derive(Clone)]
    struct Item(Rc<Inner>);

    impl Item {
        fn new(name: &str, managed: bool) -> Self {
            Self(Rc::new(Inner {
                name: RefCell::new(name.to_string()),
                status: Cell::new(ManagerChange::NONE),
                managed: Cell::new(managed),
                manager: RefCell::new(None),
            }))
        }

        fn touch(&self) {
            let manager = self.0.manager.borrow().as_ref().and_then(WeakManager::upgrade);
            if let Some(manager) = manager {
                manager.object_changed(self, ManagerChange::FULL_RESULT);
            }
        }
    }

    impl ManagedObject for Item {
        fn identifier(&self) -> String {
            self.0.name.borrow().clone()
        }
        fn set_identifier(&self, identifier: &str) {
            *self.0.name.borrow_mut() = identifier.to_string();
        }
        fn same_object(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
        fn change_status(&self) -> ManagerChange {
            self.0.status.get()
        }
        fn set_change_status(&self, status: ManagerChange) {
            self.0.status.set(status);
        }
        fn is_managed(&self) -> bool {
            self.0.managed.get()
        }
        fn reference_count(&self) -> usize {
            Rc::strong_count(&self.0)
        }
        fn set_manager(&self, manager: Option<WeakManager<Self>>) {
            *self.0.manager.borrow_mut() = manager;
        }
    }

    fn recording(manager: &Manager<Item>) -> Rc<RefCell<Vec<Vec<(String, ManagerChange)>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        manager.add_observer(move |message: &ManagerMessage<Item>| {
            sink.borrow_mut().push(
                message
                    .changes()
                    .map(|(item, change)| (item.identifier(), change))
                    .collect(),
            );
        });
        log
    }

    #[test]
    fn test_add_sends_message() {
        let manager = Manager::new();
        let log = recording(&manager);
        let item = Item::new("a", true);
        manager.add(&item).unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(
            *log.borrow(),
            vec![vec![("a".to_string(), ManagerChange::ADD)]]
        );
        assert!(item.change_status().is_none());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let manager = Manager::new();
        manager.add(&Item::new("a", true)).unwrap();
        assert!(matches!(
            manager.add(&Item::new("a", true)),
            Err(ZincError::NameInUse(_))
        ));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_cache_batches_changes() {
        let manager = Manager::new();
        let a = Item::new("a", true);
        let b = Item::new("b", true);
        manager.add(&a).unwrap();
        manager.add(&b).unwrap();
        let log = recording(&manager);

        manager.begin_cache();
        manager.begin_cache();
        a.touch();
        b.touch();
        a.touch();
        manager.end_cache().unwrap();
        assert!(log.borrow().is_empty());
        manager.end_cache().unwrap();

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].len(), 2);
        assert!(matches!(manager.end_cache(), Err(ZincError::CacheNotEnabled)));
    }

    #[test]
    fn test_change_absorbed_into_add() {
        let manager = Manager::new();
        let log = recording(&manager);
        let item = Item::new("a", true);
        manager.begin_cache();
        manager.add(&item).unwrap();
        item.touch();
        manager.end_cache().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![vec![("a".to_string(), ManagerChange::ADD)]]
        );
    }

    #[test]
    fn test_rename() {
        let manager = Manager::new();
        let a = Item::new("a", true);
        let b = Item::new("b", true);
        manager.add(&a).unwrap();
        manager.add(&b).unwrap();
        let log = recording(&manager);

        assert!(matches!(manager.rename(&b, "a"), Err(ZincError::NameInUse(_))));
        assert_eq!(b.identifier(), "b");
        assert!(log.borrow().is_empty());

        manager.rename(&b, "c").unwrap();
        assert!(manager.find_by_identifier("b").is_none());
        assert!(manager.find_by_identifier("c").unwrap().same_object(&b));
        assert_eq!(
            *log.borrow(),
            vec![vec![("c".to_string(), ManagerChange::IDENTIFIER)]]
        );
    }

    #[test]
    fn test_remove() {
        let manager = Manager::new();
        let item = Item::new("a", true);
        manager.add(&item).unwrap();
        let log = recording(&manager);
        manager.remove(&item).unwrap();
        assert!(manager.is_empty());
        assert!(!manager.contains(&item));
        assert_eq!(
            *log.borrow(),
            vec![vec![("a".to_string(), ManagerChange::REMOVE)]]
        );
        assert!(matches!(
            manager.remove(&item),
            Err(ZincError::NotInManager(_))
        ));
    }

    #[test]
    fn test_unmanaged_unreferenced_objects_are_swept() {
        let manager = Manager::new();
        let kept = Item::new("kept", false);
        manager.add(&kept).unwrap();
        manager.add(&Item::new("dropped", false)).unwrap();
        assert_eq!(manager.len(), 2);

        assert_eq!(manager.purge_unreferenced(), 1);
        assert_eq!(manager.len(), 1);
        assert!(manager.find_by_identifier("kept").is_some());

        drop(kept);
        assert_eq!(manager.purge_unreferenced(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_managed_objects_survive_sweep() {
        let manager = Manager::new();
        manager.add(&Item::new("a", true)).unwrap();
        assert_eq!(manager.purge_unreferenced(), 0);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_held_reference_count() {
        let manager = Manager::new();
        let item = Item::new("a", true);
        let outsider = Item::new("b", true);
        manager.add(&item).unwrap();
        assert_eq!(manager.held_reference_count(&item), 1);
        assert_eq!(manager.held_reference_count(&outsider), 0);

        manager.begin_cache();
        item.touch();
        assert_eq!(manager.held_reference_count(&item), 2);
        assert_eq!(item.reference_count(), 3);
        manager.end_cache().unwrap();
        assert_eq!(manager.held_reference_count(&item), 1);

        let counts = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&counts);
        let observed = Rc::clone(&manager.0);
        manager.add_observer(move |message: &ManagerMessage<Item>| {
            for (object, _) in message.changes() {
                sink.borrow_mut().push(held_by(&*observed.borrow(), object));
            }
        });
        item.touch();
        assert_eq!(*counts.borrow(), [2]);
    }

    #[test]
    fn test_pending_changes_do_not_block_sweep() {
        let manager = Manager::new();
        manager.begin_cache();
        let item = Item::new("a", false);
        manager.add(&item).unwrap();
        drop(item);
        assert_eq!(manager.purge_unreferenced(), 1);
        assert!(manager.is_empty());
        manager.end_cache().unwrap();
    }

    #[test]
    fn test_remove_observer() {
        let manager = Manager::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let id = manager.add_observer(move |_: &ManagerMessage<Item>| counter.set(counter.get() + 1));
        manager.add(&Item::new("a", true)).unwrap();
        assert!(manager.remove_observer(id));
        assert!(!manager.remove_observer(id));
        manager.add(&Item::new("b", true)).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(manager.observer_count(), 0);
    }

    #[test]
    fn test_observer_changes_are_delivered_in_same_flush() {
        let manager = Manager::new();
        let a = Item::new("a", true);
        let b = Item::new("b", true);
        manager.add(&a).unwrap();
        manager.add(&b).unwrap();

        let b_in_observer = b.clone();
        let messages = Rc::new(Cell::new(0));
        let seen = Rc::clone(&messages);
        manager.add_observer(move |message: &ManagerMessage<Item>| {
            seen.set(seen.get() + 1);
            if message.object_change(&b_in_observer).is_none() {
                b_in_observer.touch();
            }
        });
        a.touch();
        assert_eq!(messages.get(), 2);
        assert!(b.change_status().is_none());
    }
}

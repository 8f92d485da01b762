//! AND/OR operator filters combining an ordered list of operand filters.

use std::cell::RefCell;
use std::ops::Deref;

use zinc_core::{ManagerChange, Result, ZincError};

use crate::filter::{FilterKind, Operand, Scenefilter};

/// Handle to an AND or OR scene filter, giving access to its operands.
///
/// Operands are kept in order without duplicates, and each can be switched
/// off without removing it. An operand is never allowed to depend on the
/// operator it is added to, so the filter graph stays acyclic.
#[derive(Clone, PartialEq, Eq)]
pub struct ScenefilterOperator(Scenefilter);

impl ScenefilterOperator {
    pub(crate) fn from_filter(filter: &Scenefilter) -> Option<Self> {
        match &filter.0.kind {
            FilterKind::Operator { .. } => Some(Self(filter.clone())),
            _ => None,
        }
    }

    /// Returns the underlying filter handle.
    #[must_use]
    pub fn as_scenefilter(&self) -> &Scenefilter {
        &self.0
    }

    /// Appends `operand` as an active operand.
    ///
    /// An existing operand is moved to the end instead. Fails without
    /// changing anything if `operand` is this filter or depends on it, or
    /// belongs to another module.
    pub fn append_operand(&self, operand: &Scenefilter) -> Result<()> {
        let operands = self.operand_list();
        let position = position_of(&operands.borrow(), operand);
        match position {
            Some(index) => {
                let mut operands = operands.borrow_mut();
                let existing = operands.remove(index);
                operands.push(existing);
            }
            None => {
                self.check_new_operand(operand)?;
                operands.borrow_mut().push(Operand::new(operand.clone()));
            }
        }
        self.0.changed(ManagerChange::FULL_RESULT);
        Ok(())
    }

    /// Inserts `operand` immediately before `reference`.
    ///
    /// `reference` must already be an operand. An existing `operand` is
    /// moved; a new one is added as active.
    ///
    /// A new operand is subject to the same checks as in
    /// [`append_operand`](Self::append_operand).
    pub fn insert_operand_before(
        &self,
        operand: &Scenefilter,
        reference: &Scenefilter,
    ) -> Result<()> {
        let operands = self.operand_list();
        if position_of(&operands.borrow(), reference).is_none() {
            return Err(self.not_found(reference));
        }
        if operand.ptr_eq(reference) {
            return Ok(());
        }
        let existing = position_of(&operands.borrow(), operand);
        let entry = match existing {
            Some(index) => operands.borrow_mut().remove(index),
            None => {
                self.check_new_operand(operand)?;
                Operand::new(operand.clone())
            }
        };
        {
            let mut operands = operands.borrow_mut();
            let index = position_of(&operands, reference).unwrap_or(operands.len());
            operands.insert(index, entry);
        }
        self.0.changed(ManagerChange::FULL_RESULT);
        Ok(())
    }

    /// Removes `operand` from this filter.
    pub fn remove_operand(&self, operand: &Scenefilter) -> Result<()> {
        let operands = self.operand_list();
        let position = position_of(&operands.borrow(), operand);
        let Some(index) = position else {
            return Err(self.not_found(operand));
        };
        operands.borrow_mut().remove(index);
        self.0.changed(ManagerChange::FULL_RESULT);
        Ok(())
    }

    /// Returns the first operand, if any.
    #[must_use]
    pub fn first_operand(&self) -> Option<Scenefilter> {
        self.operand_list()
            .borrow()
            .first()
            .map(|operand| operand.filter.clone())
    }

    /// Returns the operand after `reference`, or `None` at the end of the
    /// list or if `reference` is not an operand.
    #[must_use]
    pub fn next_operand(&self, reference: &Scenefilter) -> Option<Scenefilter> {
        let operands = self.operand_list().borrow();
        let index = position_of(&operands, reference)?;
        operands.get(index + 1).map(|operand| operand.filter.clone())
    }

    /// Returns all operands in evaluation order.
    #[must_use]
    pub fn operands(&self) -> Vec<Scenefilter> {
        self.operand_list()
            .borrow()
            .iter()
            .map(|operand| operand.filter.clone())
            .collect()
    }

    /// Returns the number of operands, active or not.
    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operand_list().borrow().len()
    }

    /// Returns whether `operand` takes part in evaluation. False if it is
    /// not an operand of this filter.
    #[must_use]
    pub fn is_operand_active(&self, operand: &Scenefilter) -> bool {
        let operands = self.operand_list().borrow();
        position_of(&operands, operand).is_some_and(|index| operands[index].is_active)
    }

    /// Sets whether `operand` takes part in evaluation.
    pub fn set_operand_active(&self, operand: &Scenefilter, active: bool) -> Result<()> {
        let was_active = {
            let mut operands = self.operand_list().borrow_mut();
            let Some(index) = position_of(&operands, operand) else {
                return Err(self.not_found(operand));
            };
            std::mem::replace(&mut operands[index].is_active, active)
        };
        if was_active != active {
            self.0.changed(ManagerChange::FULL_RESULT);
        }
        Ok(())
    }

    fn operand_list(&self) -> &RefCell<Vec<Operand>> {
        match &self.0 .0.kind {
            FilterKind::Operator { operands, .. } => operands,
            _ => unreachable!("operator handle always wraps an operator filter"),
        }
    }

    fn check_new_operand(&self, operand: &Scenefilter) -> Result<()> {
        let same_module = match (self.0.manager(), operand.manager()) {
            (Some(own), Some(other)) => own.ptr_eq(&other),
            (None, None) => true,
            _ => false,
        };
        if !same_module {
            log::warn!(
                "cannot add scene filter '{}' to '{}': not in the same module",
                operand.name(),
                self.0.name()
            );
            return Err(ZincError::NotInManager(operand.name()));
        }
        self.check_not_circular(operand)
    }

    fn check_not_circular(&self, operand: &Scenefilter) -> Result<()> {
        if operand.depends_on_filter(&self.0) {
            log::warn!(
                "cannot add scene filter '{}' to '{}': circular dependency",
                operand.name(),
                self.0.name()
            );
            return Err(ZincError::CircularDependency {
                operator: self.0.name(),
                operand: operand.name(),
            });
        }
        Ok(())
    }

    fn not_found(&self, operand: &Scenefilter) -> ZincError {
        ZincError::OperandNotFound {
            operator: self.0.name(),
            operand: operand.name(),
        }
    }
}

fn position_of(operands: &[Operand], filter: &Scenefilter) -> Option<usize> {
    operands
        .iter()
        .position(|operand| operand.filter.ptr_eq(filter))
}

impl Deref for ScenefilterOperator {
    type Target = Scenefilter;

    fn deref(&self) -> &Scenefilter {
        &self.0
    }
}

impl AsRef<Scenefilter> for ScenefilterOperator {
    fn as_ref(&self) -> &Scenefilter {
        &self.0
    }
}

impl From<ScenefilterOperator> for Scenefilter {
    fn from(operator: ScenefilterOperator) -> Self {
        operator.0
    }
}

impl std::fmt::Debug for ScenefilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenefilterOperator")
            .field("name", &self.0.name())
            .field("type", &self.0.filter_type())
            .field("operands", &self.operands().iter().map(Scenefilter::name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::OperatorKind;
    use crate::test_support::TestGraphics;
    use zinc_core::Region;

    fn operator(name: &str, kind: OperatorKind) -> ScenefilterOperator {
        let filter = Scenefilter::new(
            name.to_string(),
            FilterKind::Operator {
                kind,
                operands: RefCell::new(Vec::new()),
            },
        );
        filter.as_operator().unwrap()
    }

    fn name_filter(name: &str, match_name: &str) -> Scenefilter {
        Scenefilter::new(
            name.to_string(),
            FilterKind::GraphicsName(RefCell::new(match_name.to_string())),
        )
    }

    fn names(operator: &ScenefilterOperator) -> Vec<String> {
        let mut result = Vec::new();
        let mut current = operator.first_operand();
        while let Some(filter) = current {
            result.push(filter.name());
            current = operator.next_operand(&filter);
        }
        result
    }

    #[test]
    fn test_vacuous_results() {
        let region = Region::new_root();
        let graphics = TestGraphics::new("g", &region);
        let and = operator("and", OperatorKind::And);
        let or = operator("or", OperatorKind::Or);
        assert!(and.evaluate_graphics(&graphics));
        assert!(!or.evaluate_graphics(&graphics));

        and.set_inverse(true);
        or.set_inverse(true);
        assert!(!and.evaluate_graphics(&graphics));
        assert!(or.evaluate_graphics(&graphics));
    }

    #[test]
    fn test_all_inactive_operands_are_vacuous() {
        let region = Region::new_root();
        let graphics = TestGraphics::new("g", &region);
        let never = name_filter("never", "nothing");
        let always = name_filter("always", "g");

        let and = operator("and", OperatorKind::And);
        and.append_operand(&never).unwrap();
        assert!(!and.evaluate_graphics(&graphics));
        and.set_operand_active(&never, false).unwrap();
        assert!(and.evaluate_graphics(&graphics));

        let or = operator("or", OperatorKind::Or);
        or.append_operand(&always).unwrap();
        assert!(or.evaluate_graphics(&graphics));
        or.set_operand_active(&always, false).unwrap();
        assert!(!or.evaluate_graphics(&graphics));
    }

    #[test]
    fn test_and_or_semantics() {
        let region = Region::new_root();
        let foo = TestGraphics::new("foo", &region);
        let bar = TestGraphics::new("bar", &region);
        let is_foo = name_filter("is_foo", "foo");
        let is_bar = name_filter("is_bar", "bar");

        let and = operator("and", OperatorKind::And);
        and.append_operand(&is_foo).unwrap();
        and.append_operand(&is_bar).unwrap();
        assert!(!and.evaluate_graphics(&foo));
        assert!(!and.evaluate_graphics(&bar));

        let or = operator("or", OperatorKind::Or);
        or.append_operand(&is_foo).unwrap();
        or.append_operand(&is_bar).unwrap();
        assert!(or.evaluate_graphics(&foo));
        assert!(or.evaluate_graphics(&bar));
        assert!(!or.evaluate_graphics(&TestGraphics::new("baz", &region)));
    }

    #[test]
    fn test_append_existing_moves_to_end() {
        let op = operator("op", OperatorKind::And);
        let a = name_filter("a", "a");
        let b = name_filter("b", "b");
        let c = name_filter("c", "c");
        op.append_operand(&a).unwrap();
        op.append_operand(&b).unwrap();
        op.append_operand(&c).unwrap();
        op.append_operand(&a).unwrap();
        assert_eq!(op.operand_count(), 3);
        assert_eq!(names(&op), ["b", "c", "a"]);
    }

    #[test]
    fn test_self_and_cycles_rejected() {
        let a = operator("a", OperatorKind::And);
        let b = operator("b", OperatorKind::Or);
        let c = operator("c", OperatorKind::And);

        assert!(matches!(
            a.append_operand(&a),
            Err(ZincError::CircularDependency { .. })
        ));
        assert_eq!(a.operand_count(), 0);

        a.append_operand(&b).unwrap();
        assert!(b.append_operand(&a).is_err());
        assert_eq!(b.operand_count(), 0);

        b.append_operand(&c).unwrap();
        assert!(c.append_operand(&a).is_err());
        assert!(c.append_operand(&b).is_err());
        assert_eq!(c.operand_count(), 0);
    }

    #[test]
    fn test_diamond_is_allowed() {
        let top = operator("top", OperatorKind::And);
        let left = operator("left", OperatorKind::Or);
        let right = operator("right", OperatorKind::Or);
        let shared = name_filter("shared", "g");
        left.append_operand(&shared).unwrap();
        right.append_operand(&shared).unwrap();
        top.append_operand(&left).unwrap();
        top.append_operand(&right).unwrap();
        top.append_operand(&shared).unwrap();

        let region = Region::new_root();
        assert!(top.evaluate_graphics(&TestGraphics::new("g", &region)));
        assert!(top.depends_on_filter(&shared));
        assert!(!shared.depends_on_filter(&top));
    }

    #[test]
    fn test_remove_operand() {
        let op = operator("op", OperatorKind::And);
        let a = name_filter("a", "a");
        let b = name_filter("b", "b");
        op.append_operand(&a).unwrap();
        op.remove_operand(&a).unwrap();
        assert_eq!(op.operand_count(), 0);
        assert!(matches!(
            op.remove_operand(&b),
            Err(ZincError::OperandNotFound { .. })
        ));
    }

    #[test]
    fn test_insert_operand_before() {
        let op = operator("op", OperatorKind::Or);
        let a = name_filter("a", "a");
        let b = name_filter("b", "b");
        let c = name_filter("c", "c");
        let d = name_filter("d", "d");

        assert!(op.insert_operand_before(&a, &b).is_err());
        assert_eq!(op.operand_count(), 0);

        op.append_operand(&a).unwrap();
        op.append_operand(&b).unwrap();
        op.insert_operand_before(&c, &a).unwrap();
        assert_eq!(names(&op), ["c", "a", "b"]);

        op.insert_operand_before(&b, &c).unwrap();
        assert_eq!(names(&op), ["b", "c", "a"]);

        op.insert_operand_before(&a, &a).unwrap();
        assert_eq!(names(&op), ["b", "c", "a"]);

        assert!(op.insert_operand_before(&d, &d).is_err());
        assert!(op.is_operand_active(&c));
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let outer = operator("outer", OperatorKind::And);
        let inner = operator("inner", OperatorKind::And);
        let leaf = name_filter("leaf", "x");
        outer.append_operand(&inner).unwrap();
        inner.append_operand(&leaf).unwrap();
        assert!(matches!(
            inner.insert_operand_before(&outer, &leaf),
            Err(ZincError::CircularDependency { .. })
        ));
        assert_eq!(inner.operand_count(), 1);
    }

    #[test]
    fn test_next_operand_edges() {
        let op = operator("op", OperatorKind::And);
        let a = name_filter("a", "a");
        let stranger = name_filter("stranger", "s");
        assert!(op.first_operand().is_none());
        op.append_operand(&a).unwrap();
        assert!(op.next_operand(&a).is_none());
        assert!(op.next_operand(&stranger).is_none());
    }

    #[test]
    fn test_operand_active_flags() {
        let op = operator("op", OperatorKind::And);
        let a = name_filter("a", "a");
        let stranger = name_filter("stranger", "s");
        op.append_operand(&a).unwrap();
        assert!(op.is_operand_active(&a));
        op.set_operand_active(&a, false).unwrap();
        assert!(!op.is_operand_active(&a));
        assert!(!op.is_operand_active(&stranger));
        assert!(op.set_operand_active(&stranger, true).is_err());
    }

    #[test]
    fn test_display_lists_operands() {
        let op = operator("op", OperatorKind::Or);
        let a = name_filter("a", "a");
        let b = name_filter("b", "b");
        assert_eq!(op.to_string(), "op operator_or");
        op.append_operand(&a).unwrap();
        op.append_operand(&b).unwrap();
        op.set_operand_active(&b, false).unwrap();
        assert_eq!(op.to_string(), "op operator_or add_filters a b(inactive)");
    }
}

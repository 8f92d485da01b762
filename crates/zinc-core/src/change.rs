//! Change flags recorded against managed objects between manager updates.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bit set describing how a managed object changed since the last update.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ManagerChange(u8);

impl ManagerChange {
    /// No change.
    pub const NONE: Self = Self(0);
    /// Object was added to the manager.
    pub const ADD: Self = Self(1);
    /// Object was removed from the manager.
    pub const REMOVE: Self = Self(1 << 1);
    /// Object identifier (name) changed.
    pub const IDENTIFIER: Self = Self(1 << 2);
    /// Object definition changed in a way that does not affect its result.
    pub const DEFINITION: Self = Self(1 << 3);
    /// Object result changed completely.
    pub const FULL_RESULT: Self = Self(1 << 4);
    /// Object result changed for a subset of its domain.
    pub const PARTIAL_RESULT: Self = Self(1 << 5);
    /// Any result change.
    pub const RESULT: Self = Self(Self::FULL_RESULT.0 | Self::PARTIAL_RESULT.0);
    /// Any change to the object other than its identifier.
    pub const OBJECT_NOT_IDENTIFIER: Self = Self(Self::DEFINITION.0 | Self::RESULT.0);
    /// Any change to the object.
    pub const OBJECT: Self = Self(Self::IDENTIFIER.0 | Self::OBJECT_NOT_IDENTIFIER.0);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::ADD, "ADD"),
        (Self::REMOVE, "REMOVE"),
        (Self::IDENTIFIER, "IDENTIFIER"),
        (Self::DEFINITION, "DEFINITION"),
        (Self::FULL_RESULT, "FULL_RESULT"),
        (Self::PARTIAL_RESULT, "PARTIAL_RESULT"),
    ];

    /// Returns true if no flags are set.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if all flags in `other` are set.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if any flag in `other` is set.
    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ManagerChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ManagerChange {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ManagerChange {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for ManagerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_flags() {
        assert!(ManagerChange::RESULT.contains(ManagerChange::FULL_RESULT));
        assert!(ManagerChange::RESULT.contains(ManagerChange::PARTIAL_RESULT));
        assert!(ManagerChange::OBJECT.contains(ManagerChange::IDENTIFIER));
        assert!(!ManagerChange::OBJECT_NOT_IDENTIFIER.intersects(ManagerChange::IDENTIFIER));
    }

    #[test]
    fn test_accumulate() {
        let mut change = ManagerChange::NONE;
        assert!(change.is_none());
        change |= ManagerChange::IDENTIFIER;
        change |= ManagerChange::FULL_RESULT;
        assert!(change.intersects(ManagerChange::RESULT));
        assert!(!change.contains(ManagerChange::RESULT));
        assert_eq!(change & ManagerChange::IDENTIFIER, ManagerChange::IDENTIFIER);
    }

    #[test]
    fn test_debug_names() {
        assert_eq!(format!("{:?}", ManagerChange::NONE), "NONE");
        assert_eq!(
            format!("{:?}", ManagerChange::ADD | ManagerChange::FULL_RESULT),
            "ADD | FULL_RESULT"
        );
    }
}

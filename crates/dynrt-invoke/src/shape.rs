//! Native argument slot shapes
//!
//! A [`SlotShape`] lists, in push order, the native kind of every argument a
//! call passes, receiver included. Shapes compare and hash by content, so two
//! unrelated methods with the same slot layout share one call descriptor.

use std::fmt;

/// Native storage kind of one argument slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Pointer-sized opaque handle or out-pointer
    Pointer,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Pointer => write!(f, "pointer"),
        }
    }
}

/// Ordered argument slots of a native call
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SlotShape {
    slots: Vec<SlotKind>,
}

impl SlotShape {
    /// Empty shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape holding only the receiver slot
    pub fn receiver() -> Self {
        Self::pointers(1)
    }

    /// Shape of `count` pointer slots
    pub fn pointers(count: usize) -> Self {
        Self {
            slots: vec![SlotKind::Pointer; count],
        }
    }

    /// Append a slot
    pub fn push(&mut self, kind: SlotKind) {
        self.slots.push(kind);
    }

    /// Slots in push order
    pub fn kinds(&self) -> &[SlotKind] {
        &self.slots
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the shape has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl From<Vec<SlotKind>> for SlotShape {
    fn from(slots: Vec<SlotKind>) -> Self {
        Self { slots }
    }
}

impl fmt::Display for SlotShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", slot)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(shape: &SlotShape) -> u64 {
        let mut hasher = DefaultHasher::new();
        shape.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_by_content() {
        let mut built = SlotShape::receiver();
        built.push(SlotKind::Pointer);
        let direct = SlotShape::pointers(2);

        assert_eq!(built, direct);
        assert_eq!(hash_of(&built), hash_of(&direct));
        assert_ne!(built, SlotShape::receiver());
    }

    #[test]
    fn test_display() {
        assert_eq!(SlotShape::pointers(2).to_string(), "(pointer, pointer)");
        assert_eq!(SlotShape::new().to_string(), "()");
    }
}

//! Composite memoization keys
//!
//! Provides [`SetValuedKey`], the key partial resolution results are cached
//! under: two ordered sequences concatenated into one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tang_types::{ConstructorDef, Node};

/// Concatenation of two ordered sequences
///
/// Equality is positional. The hash is the sum of the element hashes, which
/// ignores order; that only affects bucket spread, never equality.
#[derive(Debug, Clone)]
pub struct SetValuedKey<T> {
    key: Vec<T>,
}

impl<T: Clone> SetValuedKey<T> {
    /// Key over `ts` followed by `us`
    #[must_use]
    pub fn new(ts: &[T], us: &[T]) -> Self {
        let mut key = Vec::with_capacity(ts.len() + us.len());
        key.extend_from_slice(ts);
        key.extend_from_slice(us);
        Self { key }
    }
}

impl<T> SetValuedKey<T> {
    /// Elements in order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.key
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// True for a key over two empty sequences
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl SetValuedKey<String> {
    /// Key for the plan of a whole node
    #[must_use]
    pub fn for_node(node: &dyn Node) -> Self {
        Self {
            key: vec![node.full_name().to_string()],
        }
    }

    /// Key for one constructor of a class: the class followed by its
    /// parameter identities
    #[must_use]
    pub fn for_constructor(constructor: &dyn ConstructorDef) -> Self {
        Self::new(
            &[constructor.class_name().to_string()],
            &constructor.arg_names(),
        )
    }
}

impl<T: PartialEq> PartialEq for SetValuedKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: Eq> Eq for SetValuedKey<T> {}

impl<T: Hash> Hash for SetValuedKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self.key.iter().fold(0u64, |acc, element| {
            let mut hasher = DefaultHasher::new();
            element.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        state.write_u64(sum);
    }
}

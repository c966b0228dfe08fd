use std::fmt;
use std::sync::Arc;

/// Per-item value source: a constant shared by every item, or a function of the item.
pub enum Accessor<T: ?Sized, V> {
    Constant(V),
    Function(Arc<dyn Fn(&T) -> V + Send + Sync>),
}

impl<T: ?Sized, V> Accessor<T, V> {
    pub fn constant(value: V) -> Self {
        Accessor::Constant(value)
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Accessor::Function(Arc::new(f))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Accessor::Constant(_))
    }
}

impl<T: ?Sized, V: Clone> Accessor<T, V> {
    #[inline]
    pub fn get(&self, item: &T) -> V {
        match self {
            Accessor::Constant(value) => value.clone(),
            Accessor::Function(f) => f(item),
        }
    }
}

impl<T: ?Sized, V: PartialEq> Accessor<T, V> {
    /// Equal constants, or the very same function
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Accessor::Constant(a), Accessor::Constant(b)) => a == b,
            (Accessor::Function(a), Accessor::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: ?Sized, V: Clone> Clone for Accessor<T, V> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Constant(value) => Accessor::Constant(value.clone()),
            Accessor::Function(f) => Accessor::Function(Arc::clone(f)),
        }
    }
}

impl<T: ?Sized, V: fmt::Debug> fmt::Debug for Accessor<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Accessor::Function(_) => f.write_str("Function(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_and_function() {
        let c: Accessor<str, usize> = Accessor::constant(3);
        let f: Accessor<str, usize> = Accessor::function(|s: &str| s.len());
        assert_eq!(c.get("hello"), 3);
        assert_eq!(f.get("hello"), 5);
        assert!(c.is_constant());
        assert!(!f.is_constant());
    }

    #[test]
    fn test_same_as() {
        let f: Accessor<str, usize> = Accessor::function(|s: &str| s.len());
        let g: Accessor<str, usize> = Accessor::function(|s: &str| s.len());
        assert!(f.same_as(&f.clone()));
        assert!(!f.same_as(&g));
        assert!(Accessor::<str, u8>::constant(1).same_as(&Accessor::constant(1)));
        assert!(!Accessor::<str, u8>::constant(1).same_as(&Accessor::constant(2)));
        assert!(!f.same_as(&Accessor::constant(5)));
    }

    #[test]
    fn test_debug() {
        let f: Accessor<str, usize> = Accessor::function(|s: &str| s.len());
        assert_eq!(format!("{:?}", f), "Function(..)");
        assert_eq!(format!("{:?}", Accessor::<str, u8>::constant(7)), "Constant(7)");
    }
}

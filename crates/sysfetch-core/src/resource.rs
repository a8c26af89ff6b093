//! Tri-state ownership for resources that may never be created.

/// A resource owned by the runtime state.
///
/// `destroy` releases the value only from `Created`, so teardown can run
/// over every resource without knowing which ones were ever set up, and a
/// second teardown releases nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resource<T> {
    #[default]
    Uninitialized,
    Created(T),
    Destroyed,
}

impl<T> Resource<T> {
    /// Store a value, replacing (and dropping) any previous one.
    pub fn create(&mut self, value: T) {
        *self = Resource::Created(value);
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Resource::Created(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Resource::Created(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Resource::Created(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Resource::Destroyed)
    }

    /// Release the value if one was created.
    ///
    /// Returns whether a value was released by this call. `Uninitialized`
    /// stays `Uninitialized`.
    pub fn destroy(&mut self) -> bool {
        match self {
            Resource::Created(_) => {
                *self = Resource::Destroyed;
                true
            }
            Resource::Uninitialized | Resource::Destroyed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn destroy_uninitialized_is_noop() {
        let mut r: Resource<String> = Resource::default();
        assert!(!r.destroy());
        assert_eq!(r, Resource::Uninitialized);
    }

    #[test]
    fn destroy_created_releases_once() {
        let value = Rc::new(());
        let mut r = Resource::Uninitialized;
        r.create(Rc::clone(&value));
        assert_eq!(Rc::strong_count(&value), 2);

        assert!(r.destroy());
        assert_eq!(Rc::strong_count(&value), 1);
        assert!(r.is_destroyed());

        assert!(!r.destroy());
        assert_eq!(Rc::strong_count(&value), 1);
    }

    #[test]
    fn accessors_only_see_created() {
        let mut r = Resource::Created(5);
        assert_eq!(r.get(), Some(&5));
        if let Some(v) = r.get_mut() {
            *v = 6;
        }
        assert_eq!(r.get(), Some(&6));
        r.destroy();
        assert_eq!(r.get(), None);
    }
}

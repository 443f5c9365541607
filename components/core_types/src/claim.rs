//! Counted shared ownership for interpreter state.
//!
//! Execution contexts and composite stack items can be referenced from
//! several places at once: a stack slot, a parent array, a host that keeps a
//! handle across calls. Every holder owns exactly one [`Claim`]. Taking a new
//! reference is [`Claim::claim`], dropping a handle releases it, and the value
//! is reclaimed exactly when the last handle goes away.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// A claimed, shared reference to a mutable value.
///
/// # Examples
///
/// ```
/// use core_types::Claim;
///
/// let first = Claim::new(vec![1u8, 2, 3]);
/// let second = first.claim();
/// assert_eq!(first.claims(), 2);
///
/// // Not the last holder: the value stays alive.
/// assert!(second.release().is_none());
/// assert_eq!(first.claims(), 1);
///
/// // Last holder: the value is handed back and freed with it.
/// assert_eq!(first.release(), Some(vec![1, 2, 3]));
/// ```
pub struct Claim<T>(Rc<RefCell<T>>);

/// A non-owning observer of a [`Claim`]ed value.
///
/// Does not keep the value alive; `upgrade` fails once every claim is gone.
pub struct WeakClaim<T>(Weak<RefCell<T>>);

impl<T> Claim<T> {
    /// Create a value with a single holder
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Take another claim on the same value
    pub fn claim(&self) -> Self {
        Self(Rc::clone(&self.0))
    }

    /// Number of live claims on the value
    pub fn claims(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Release this claim, returning the value if it was the last one.
    ///
    /// When other holders remain the value is left untouched and `None` is
    /// returned.
    pub fn release(self) -> Option<T> {
        Rc::into_inner(self.0).map(RefCell::into_inner)
    }

    /// Immutably borrow the value
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the value
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether two handles refer to the same value
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the shared value, stable for its lifetime
    pub fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    /// Create a non-owning observer
    pub fn downgrade(&self) -> WeakClaim<T> {
        WeakClaim(Rc::downgrade(&self.0))
    }
}

impl<T> Clone for Claim<T> {
    fn clone(&self) -> Self {
        self.claim()
    }
}

impl<T: fmt::Debug> fmt::Debug for Claim<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f
                .debug_struct("Claim")
                .field("claims", &self.claims())
                .field("value", &*value)
                .finish(),
            Err(_) => f
                .debug_struct("Claim")
                .field("claims", &self.claims())
                .field("value", &"<borrowed>")
                .finish(),
        }
    }
}

impl<T> WeakClaim<T> {
    /// Re-acquire a claim if the value is still alive
    pub fn upgrade(&self) -> Option<Claim<T>> {
        self.0.upgrade().map(Claim)
    }

    /// Number of live claims (zero once reclaimed)
    pub fn claims(&self) -> usize {
        self.0.strong_count()
    }

    /// Whether the observed value has been reclaimed
    pub fn is_released(&self) -> bool {
        self.0.strong_count() == 0
    }
}

impl<T> Clone for WeakClaim<T> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for WeakClaim<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakClaim")
            .field("claims", &self.claims())
            .finish()
    }
}

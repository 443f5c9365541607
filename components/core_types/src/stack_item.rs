//! Stack item representation.
//!
//! Every value an opcode handler touches is a [`StackItem`]. Primitive
//! variants carry immutable data; composite variants (`Array`, `Struct`,
//! `Map`) hold their elements behind a [`Claim`] so that several containers
//! and stack slots can share one element list.
//!
//! Cloning a `StackItem` with [`Clone`] takes another claim on the same
//! value. [`StackItem::deep_clone`] produces an independent value.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{Claim, ExecutionLimits, VmError};

/// Opaque host object carried by an interop item
pub type InteropHandle = Rc<dyn Any>;

/// Source struct address paired with its copy, used by `deep_clone`
type StructCopies = Vec<(*const (), Claim<Vec<StackItem>>)>;

/// Type discriminant of a stack item.
///
/// The numeric values are the tags used in the binary export format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackItemType {
    /// Immutable byte sequence
    ByteArray = 0x00,
    /// Boolean
    Boolean = 0x01,
    /// Arbitrary-precision integer
    Integer = 0x02,
    /// Host object
    InteropInterface = 0x40,
    /// Reference-semantics list
    Array = 0x80,
    /// Value-semantics list
    Struct = 0x81,
    /// Key/value collection
    Map = 0x82,
}

impl TryFrom<u8> for StackItemType {
    type Error = VmError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0x00 => Ok(StackItemType::ByteArray),
            0x01 => Ok(StackItemType::Boolean),
            0x02 => Ok(StackItemType::Integer),
            0x40 => Ok(StackItemType::InteropInterface),
            0x80 => Ok(StackItemType::Array),
            0x81 => Ok(StackItemType::Struct),
            0x82 => Ok(StackItemType::Map),
            other => Err(VmError::InvalidItemType(other)),
        }
    }
}

/// A value on the evaluation stack.
///
/// # Examples
///
/// ```
/// use core_types::StackItem;
///
/// let bytes = StackItem::from(vec![0x00, 0x01]);
/// assert!(bytes.get_boolean());
/// assert_eq!(bytes.get_int32(), Some(256));
///
/// let array = StackItem::new_array(vec![bytes.clone()]);
/// let copy = array.deep_clone();
/// copy.push(StackItem::from(true));
/// assert_eq!(array.count(), Some(1));
/// assert_eq!(copy.count(), Some(2));
/// ```
#[derive(Clone)]
pub enum StackItem {
    /// Immutable byte sequence, shared between clones
    ByteArray(Rc<[u8]>),
    /// Boolean value
    Boolean(bool),
    /// Arbitrary-precision integer
    Integer(BigInt),
    /// Host object with no script-visible representation
    Interop(InteropHandle),
    /// List compared by identity
    Array(Claim<Vec<StackItem>>),
    /// List compared and copied by value
    Struct(Claim<Vec<StackItem>>),
    /// Ordered key/value collection compared by identity
    Map(Claim<MapItems>),
}

impl StackItem {
    /// Create an array item
    pub fn new_array(items: Vec<StackItem>) -> Self {
        StackItem::Array(Claim::new(items))
    }

    /// Create a struct item
    pub fn new_struct(items: Vec<StackItem>) -> Self {
        StackItem::Struct(Claim::new(items))
    }

    /// Create an empty map item
    pub fn new_map() -> Self {
        StackItem::Map(Claim::new(MapItems::new()))
    }

    /// Wrap a host object
    pub fn interop<T: Any>(value: T) -> Self {
        StackItem::Interop(Rc::new(value))
    }

    /// The fixed type discriminant
    pub fn item_type(&self) -> StackItemType {
        match self {
            StackItem::ByteArray(_) => StackItemType::ByteArray,
            StackItem::Boolean(_) => StackItemType::Boolean,
            StackItem::Integer(_) => StackItemType::Integer,
            StackItem::Interop(_) => StackItemType::InteropInterface,
            StackItem::Array(_) => StackItemType::Array,
            StackItem::Struct(_) => StackItemType::Struct,
            StackItem::Map(_) => StackItemType::Map,
        }
    }

    /// Truthiness of the item. Defined for every variant.
    pub fn get_boolean(&self) -> bool {
        match self {
            StackItem::ByteArray(bytes) => bytes.iter().any(|&b| b != 0),
            StackItem::Boolean(b) => *b,
            StackItem::Integer(n) => !n.is_zero(),
            StackItem::Interop(_) => true,
            StackItem::Array(_) | StackItem::Struct(_) | StackItem::Map(_) => true,
        }
    }

    /// Integer interpretation of the item.
    ///
    /// Byte arrays longer than [`ExecutionLimits::MAX_BIG_INTEGER_SIZE`] and
    /// non-primitive items have none.
    pub fn get_big_integer(&self) -> Option<BigInt> {
        self.get_big_integer_within(ExecutionLimits::MAX_BIG_INTEGER_SIZE)
    }

    /// Integer interpretation, accepting byte arrays up to `max_size` bytes
    pub fn get_big_integer_within(&self, max_size: usize) -> Option<BigInt> {
        match self {
            StackItem::ByteArray(bytes) if bytes.len() <= max_size => {
                Some(BigInt::from_signed_bytes_le(bytes))
            }
            StackItem::ByteArray(_) => None,
            StackItem::Boolean(b) => Some(BigInt::from(u8::from(*b))),
            StackItem::Integer(n) => Some(n.clone()),
            StackItem::Interop(_)
            | StackItem::Array(_)
            | StackItem::Struct(_)
            | StackItem::Map(_) => None,
        }
    }

    /// The integer value if it fits in 32 signed bits
    pub fn get_int32(&self) -> Option<i32> {
        self.get_big_integer()?.to_i32()
    }

    /// Byte-sequence representation, if the variant has one
    pub fn as_bytes(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            StackItem::ByteArray(bytes) => Some(Cow::Borrowed(bytes)),
            StackItem::Boolean(true) => Some(Cow::Borrowed(&[1])),
            StackItem::Boolean(false) => Some(Cow::Borrowed(&[])),
            StackItem::Integer(n) if n.is_zero() => Some(Cow::Borrowed(&[])),
            StackItem::Integer(n) => Some(Cow::Owned(n.to_signed_bytes_le())),
            StackItem::Interop(_)
            | StackItem::Array(_)
            | StackItem::Struct(_)
            | StackItem::Map(_) => None,
        }
    }

    /// Length of the byte-sequence representation
    pub fn read_byte_array_size(&self) -> Option<usize> {
        match self {
            StackItem::ByteArray(bytes) => Some(bytes.len()),
            other => other.as_bytes().map(|bytes| bytes.len()),
        }
    }

    /// Copy up to `count` bytes of the representation, starting at
    /// `source_index`, into `output`.
    ///
    /// Returns how many bytes were written, which is short near the end of
    /// the representation or when `output` is smaller than `count`. Returns
    /// `None` if the item has no byte representation or `source_index` lies
    /// past its end.
    pub fn read_byte_array(
        &self,
        output: &mut [u8],
        source_index: usize,
        count: usize,
    ) -> Option<usize> {
        let bytes = self.as_bytes()?;
        let available = bytes.len().checked_sub(source_index)?;
        let written = count.min(available).min(output.len());
        output[..written].copy_from_slice(&bytes[source_index..source_index + written]);
        Some(written)
    }

    /// Copy the item into a value-independent one.
    ///
    /// Composite containers are copied so that mutating the copy never
    /// affects the original. Elements of an array or map are shared by
    /// claim; nested structs are copied recursively. Immutable leaf data is
    /// shared.
    pub fn deep_clone(&self) -> StackItem {
        let mut copies = Vec::new();
        self.deep_clone_inner(&mut copies)
    }

    /// `copies` maps each struct already visited to its copy, so shared and
    /// cyclic structs keep their shape in the copy instead of pointing back
    /// into the original.
    fn deep_clone_inner(&self, copies: &mut StructCopies) -> StackItem {
        match self {
            StackItem::Array(items) => StackItem::new_array(items.borrow().clone()),
            StackItem::Map(map) => StackItem::Map(Claim::new(map.borrow().clone())),
            StackItem::Struct(items) => {
                let ptr = items.as_ptr();
                if let Some((_, copy)) = copies.iter().find(|(seen, _)| *seen == ptr) {
                    return StackItem::Struct(copy.claim());
                }
                let copy = Claim::new(Vec::new());
                copies.push((ptr, copy.claim()));
                let elements: Vec<StackItem> = items
                    .borrow()
                    .iter()
                    .map(|item| match item {
                        StackItem::Struct(_) => item.deep_clone_inner(copies),
                        other => other.clone(),
                    })
                    .collect();
                *copy.borrow_mut() = elements;
                StackItem::Struct(copy)
            }
            leaf => leaf.clone(),
        }
    }

    /// Element list of an array or struct
    pub fn as_list(&self) -> Option<&Claim<Vec<StackItem>>> {
        match self {
            StackItem::Array(items) | StackItem::Struct(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map
    pub fn as_map(&self) -> Option<&Claim<MapItems>> {
        match self {
            StackItem::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Downcast an interop item to its host type
    pub fn as_interop<T: Any>(&self) -> Option<Rc<T>> {
        match self {
            StackItem::Interop(handle) => Rc::clone(handle).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Number of elements of a composite item
    pub fn count(&self) -> Option<usize> {
        match self {
            StackItem::Array(items) | StackItem::Struct(items) => Some(items.borrow().len()),
            StackItem::Map(map) => Some(map.borrow().len()),
            _ => None,
        }
    }

    /// Append to an array or struct. Returns `false` for other variants.
    pub fn push(&self, item: StackItem) -> bool {
        match self.as_list() {
            Some(items) => {
                items.borrow_mut().push(item);
                true
            }
            None => false,
        }
    }

    /// Element at `index` of an array or struct
    pub fn get(&self, index: usize) -> Option<StackItem> {
        self.as_list()?.borrow().get(index).cloned()
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&self, index: usize, item: StackItem) -> Option<StackItem> {
        let list = self.as_list()?;
        let mut items = list.borrow_mut();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, item))
    }

    /// Identity-or-value equality as seen by scripts.
    ///
    /// Primitive items compare their byte representations, structs compare
    /// element by element and every other item compares identity.
    pub fn equals(&self, other: &StackItem) -> bool {
        let mut path = Vec::new();
        self.equals_inner(other, &mut path)
    }

    fn equals_inner(&self, other: &StackItem, path: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (StackItem::Array(a), StackItem::Array(b)) => Claim::ptr_eq(a, b),
            (StackItem::Map(a), StackItem::Map(b)) => Claim::ptr_eq(a, b),
            (StackItem::Interop(a), StackItem::Interop(b)) => Rc::ptr_eq(a, b),
            (StackItem::Struct(a), StackItem::Struct(b)) => {
                if Claim::ptr_eq(a, b) {
                    return true;
                }
                let pair = (a.as_ptr(), b.as_ptr());
                if path.contains(&pair) {
                    return true;
                }
                let (left, right) = (a.borrow(), b.borrow());
                if left.len() != right.len() {
                    return false;
                }
                path.push(pair);
                let equal = left
                    .iter()
                    .zip(right.iter())
                    .all(|(x, y)| x.equals_inner(y, path));
                path.pop();
                equal
            }
            (left, right) => match (left.as_bytes(), right.as_bytes()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl PartialEq for StackItem {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackItem::ByteArray(bytes) => f.debug_tuple("ByteArray").field(bytes).finish(),
            StackItem::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            StackItem::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            StackItem::Interop(_) => write!(f, "Interop(...)"),
            // Elements are elided: composite graphs may be cyclic.
            StackItem::Array(items) | StackItem::Struct(items) => f
                .debug_struct(if matches!(self, StackItem::Array(_)) {
                    "Array"
                } else {
                    "Struct"
                })
                .field("len", &items.borrow().len())
                .field("claims", &items.claims())
                .finish(),
            StackItem::Map(map) => f
                .debug_struct("Map")
                .field("len", &map.borrow().len())
                .field("claims", &map.claims())
                .finish(),
        }
    }
}

impl From<bool> for StackItem {
    fn from(value: bool) -> Self {
        StackItem::Boolean(value)
    }
}

impl From<BigInt> for StackItem {
    fn from(value: BigInt) -> Self {
        StackItem::Integer(value)
    }
}

impl From<i64> for StackItem {
    fn from(value: i64) -> Self {
        StackItem::Integer(BigInt::from(value))
    }
}

impl From<Vec<u8>> for StackItem {
    fn from(value: Vec<u8>) -> Self {
        StackItem::ByteArray(value.into())
    }
}

impl From<&[u8]> for StackItem {
    fn from(value: &[u8]) -> Self {
        StackItem::ByteArray(value.into())
    }
}

/// Insertion-ordered entries of a map item.
///
/// Keys are matched with [`StackItem::equals`].
#[derive(Debug, Clone, Default)]
pub struct MapItems {
    entries: Vec<(StackItem, StackItem)>,
}

impl MapItems {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &StackItem) -> Option<&StackItem> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &StackItem) -> bool {
        self.position(key).is_some()
    }

    /// Store `value` under `key`, returning the value it replaced
    pub fn insert(&mut self, key: StackItem, value: StackItem) -> Option<StackItem> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, returning its value
    pub fn remove(&mut self, key: &StackItem) -> Option<StackItem> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &StackItem> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &StackItem> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&StackItem, &StackItem)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn position(&self, key: &StackItem) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.equals(key))
    }
}

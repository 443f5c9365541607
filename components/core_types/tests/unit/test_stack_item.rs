//! Unit tests for StackItem coercions and cloning

use core_types::{Claim, StackItem, StackItemType};
use num_bigint::BigInt;

#[cfg(test)]
mod coercion_tests {
    use super::*;

    #[test]
    fn test_get_boolean_is_total() {
        let items = vec![
            StackItem::from(Vec::new()),
            StackItem::from(vec![0, 0, 1]),
            StackItem::from(false),
            StackItem::from(0i64),
            StackItem::interop(42u64),
            StackItem::new_array(vec![]),
            StackItem::new_struct(vec![]),
            StackItem::new_map(),
        ];
        let truthy: Vec<bool> = items.iter().map(StackItem::get_boolean).collect();
        assert_eq!(
            truthy,
            vec![false, true, false, false, true, true, true, true]
        );
    }

    #[test]
    fn test_get_int32_of_two_pow_40_fails() {
        let item = StackItem::from(BigInt::from(1u64 << 40));
        assert_eq!(item.get_int32(), None);
        assert_eq!(item.get_big_integer(), Some(BigInt::from(1u64 << 40)));
    }

    #[test]
    fn test_get_int32_of_byte_array() {
        assert_eq!(StackItem::from(vec![0x00, 0x80]).get_int32(), Some(-32768));
        assert_eq!(
            StackItem::from(vec![0xff, 0xff, 0xff, 0x7f]).get_int32(),
            Some(i32::MAX)
        );
        assert_eq!(
            StackItem::from(vec![0x00, 0x00, 0x00, 0x80, 0x00]).get_int32(),
            None
        );
    }

    #[test]
    fn test_coercions_do_not_mutate() {
        let item = StackItem::from(BigInt::from(-129));
        let before = item.as_bytes().unwrap().into_owned();
        let _ = item.get_boolean();
        let _ = item.get_int32();
        let mut out = [0u8; 4];
        let _ = item.read_byte_array(&mut out, 0, 4);
        assert_eq!(item.as_bytes().unwrap().into_owned(), before);
        assert_eq!(item.item_type(), StackItemType::Integer);
    }

    #[test]
    fn test_read_byte_array_sized_by_read_byte_array_size() {
        let item = StackItem::from(BigInt::from(0x0102_0304));
        let size = item.read_byte_array_size().unwrap();
        let mut buffer = vec![0u8; size];
        assert_eq!(item.read_byte_array(&mut buffer, 0, size), Some(size));
        assert_eq!(buffer, vec![0x04, 0x03, 0x02, 0x01]);
    }
}

#[cfg(test)]
mod clone_tests {
    use super::*;

    #[test]
    fn test_deep_clone_of_map_is_independent() {
        let map = StackItem::new_map();
        map.as_map()
            .unwrap()
            .borrow_mut()
            .insert(StackItem::from(1i64), StackItem::from(true));

        let copy = map.deep_clone();
        copy.as_map()
            .unwrap()
            .borrow_mut()
            .insert(StackItem::from(2i64), StackItem::from(false));

        assert_eq!(map.count(), Some(1));
        assert_eq!(copy.count(), Some(2));
    }

    #[test]
    fn test_deep_clone_has_fresh_claims() {
        let array = StackItem::new_array(vec![]);
        let _holder = array.clone();
        let copy = array.deep_clone();
        assert_eq!(array.as_list().unwrap().claims(), 2);
        assert_eq!(copy.as_list().unwrap().claims(), 1);
    }

    #[test]
    fn test_deep_clone_of_leaf_shares_bytes() {
        let bytes = StackItem::from(vec![1, 2, 3]);
        let copy = bytes.deep_clone();
        match (&bytes, &copy) {
            (StackItem::ByteArray(a), StackItem::ByteArray(b)) => {
                assert!(std::rc::Rc::ptr_eq(a, b))
            }
            _ => panic!("Expected ByteArray"),
        }
    }

    #[test]
    fn test_deep_clone_of_self_containing_struct_is_independent() {
        let node = StackItem::new_struct(vec![StackItem::from(1i64)]);
        node.push(node.clone());

        let copy = node.deep_clone();
        let nested = copy.get(1).unwrap();
        assert!(!Claim::ptr_eq(
            nested.as_list().unwrap(),
            node.as_list().unwrap()
        ));

        nested.push(StackItem::from(99i64));
        assert_eq!(node.count(), Some(2));
        assert_eq!(copy.count(), Some(3));

        drop(nested);
        node.as_list().unwrap().borrow_mut().clear();
        copy.as_list().unwrap().borrow_mut().clear();
    }

    #[test]
    fn test_deep_clone_keeps_shared_struct_shared() {
        let shared = StackItem::new_struct(vec![]);
        let outer = StackItem::new_struct(vec![shared.clone(), shared.clone()]);

        let copy = outer.deep_clone();
        let first = copy.get(0).unwrap();
        let second = copy.get(1).unwrap();
        assert!(Claim::ptr_eq(first.as_list().unwrap(), second.as_list().unwrap()));
        assert!(!Claim::ptr_eq(first.as_list().unwrap(), shared.as_list().unwrap()));
    }
}

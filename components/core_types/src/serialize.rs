//! Binary export of stack items.
//!
//! Layout: one type tag byte followed by
//! - `ByteArray`: var-int length and the bytes
//! - `Boolean`: one byte, `0` or `1`
//! - `Integer`: var-int length and the signed little-endian bytes
//! - `Array` / `Struct`: var-int count and each element
//! - `Map`: var-int count and each key followed by its value
//!
//! Interop items have no export form.

use num_bigint::BigInt;

use crate::{varint, Claim, ExecutionLimits, MapItems, StackItem, StackItemType, VmError, VmResult};

/// Nesting bound for decoding, independent of the input length
const MAX_NESTING_DEPTH: usize = 64;

impl StackItem {
    /// Exact number of bytes [`serialize`](Self::serialize) will write.
    ///
    /// Call this first to size the destination buffer.
    pub fn get_serialized_size(&self) -> VmResult<usize> {
        let mut path = Vec::new();
        size_of(self, &mut path)
    }

    /// Write the binary form into `output`, returning the bytes written.
    ///
    /// Nothing is written when `output` is too small.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::StackItem;
    ///
    /// let item = StackItem::from(vec![0xAA, 0xBB]);
    /// let size = item.get_serialized_size().unwrap();
    /// let mut buffer = vec![0u8; size];
    /// assert_eq!(item.serialize(&mut buffer), Ok(4));
    /// assert_eq!(buffer, vec![0x00, 0x02, 0xAA, 0xBB]);
    /// ```
    pub fn serialize(&self, output: &mut [u8]) -> VmResult<usize> {
        let needed = self.get_serialized_size()?;
        if output.len() < needed {
            return Err(VmError::BufferTooSmall {
                needed,
                capacity: output.len(),
            });
        }
        let bytes = self.to_bytes()?;
        output[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Binary form as an owned buffer
    pub fn to_bytes(&self) -> VmResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        write_item(self, &mut out, &mut path)?;
        Ok(out)
    }

    /// Decode one item from the start of `bytes`.
    ///
    /// Returns the item and the number of bytes consumed. Composite sizes
    /// are bounded by `limits.max_array_size`, byte arrays by
    /// `limits.max_item_size` and integers by `limits.max_big_integer_size`.
    pub fn deserialize(bytes: &[u8], limits: &ExecutionLimits) -> VmResult<(StackItem, usize)> {
        let mut reader = Reader { bytes, offset: 0 };
        let item = reader.item(limits, 0)?;
        Ok((item, reader.offset))
    }
}

fn var_bytes_size(len: usize) -> usize {
    varint::encoded_len(len as u64) + len
}

fn enter(path: &mut Vec<*const ()>, ptr: *const ()) -> VmResult<()> {
    if path.contains(&ptr) {
        return Err(VmError::CircularReference);
    }
    path.push(ptr);
    Ok(())
}

fn size_of(item: &StackItem, path: &mut Vec<*const ()>) -> VmResult<usize> {
    let body = match item {
        StackItem::ByteArray(bytes) => var_bytes_size(bytes.len()),
        StackItem::Boolean(_) => 1,
        StackItem::Integer(_) => var_bytes_size(item.read_byte_array_size().unwrap_or(0)),
        StackItem::Interop(_) => return Err(VmError::NotSerializable(item.item_type())),
        StackItem::Array(items) | StackItem::Struct(items) => {
            enter(path, items.as_ptr())?;
            let list = items.borrow();
            let mut total = varint::encoded_len(list.len() as u64);
            for element in list.iter() {
                total += size_of(element, path)?;
            }
            path.pop();
            total
        }
        StackItem::Map(map) => {
            enter(path, map.as_ptr())?;
            let entries = map.borrow();
            let mut total = varint::encoded_len(entries.len() as u64);
            for (key, value) in entries.iter() {
                total += size_of(key, path)? + size_of(value, path)?;
            }
            path.pop();
            total
        }
    };
    Ok(1 + body)
}

fn write_var_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    varint::write(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

fn write_item(item: &StackItem, out: &mut Vec<u8>, path: &mut Vec<*const ()>) -> VmResult<()> {
    out.push(item.item_type() as u8);
    match item {
        StackItem::Interop(_) => return Err(VmError::NotSerializable(item.item_type())),
        StackItem::ByteArray(bytes) => write_var_bytes(bytes, out),
        StackItem::Boolean(b) => out.push(u8::from(*b)),
        StackItem::Integer(_) => {
            let bytes = item.as_bytes().unwrap_or_default();
            write_var_bytes(&bytes, out);
        }
        StackItem::Array(items) | StackItem::Struct(items) => {
            enter(path, items.as_ptr())?;
            let list = items.borrow();
            varint::write(list.len() as u64, out);
            for element in list.iter() {
                write_item(element, out, path)?;
            }
            path.pop();
        }
        StackItem::Map(map) => {
            enter(path, map.as_ptr())?;
            let entries = map.borrow();
            varint::write(entries.len() as u64, out);
            for (key, value) in entries.iter() {
                write_item(key, out, path)?;
                write_item(value, out, path)?;
            }
            path.pop();
        }
    }
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> VmResult<u8> {
        let byte = *self.bytes.get(self.offset).ok_or(VmError::UnexpectedEnd)?;
        self.offset += 1;
        Ok(byte)
    }

    fn var_int(&mut self) -> VmResult<u64> {
        let (value, used) = varint::read(&self.bytes[self.offset..]).ok_or(VmError::UnexpectedEnd)?;
        self.offset += used;
        Ok(value)
    }

    fn bounded_len(&mut self, what: &'static str, limit: usize) -> VmResult<usize> {
        let len = self.var_int()?;
        if len > limit as u64 {
            return Err(VmError::LimitExceeded { what, limit });
        }
        Ok(len as usize)
    }

    fn var_bytes(&mut self, what: &'static str, limit: usize) -> VmResult<&'a [u8]> {
        let len = self.bounded_len(what, limit)?;
        let end = self.offset.checked_add(len).ok_or(VmError::UnexpectedEnd)?;
        let slice = self.bytes.get(self.offset..end).ok_or(VmError::UnexpectedEnd)?;
        self.offset = end;
        Ok(slice)
    }

    fn item(&mut self, limits: &ExecutionLimits, depth: usize) -> VmResult<StackItem> {
        if depth > MAX_NESTING_DEPTH {
            return Err(VmError::LimitExceeded {
                what: "nesting depth",
                limit: MAX_NESTING_DEPTH,
            });
        }
        match StackItemType::try_from(self.byte()?)? {
            StackItemType::ByteArray => {
                let bytes = self.var_bytes("byte array length", limits.max_item_size)?;
                Ok(StackItem::from(bytes))
            }
            StackItemType::Boolean => Ok(StackItem::Boolean(self.byte()? != 0)),
            StackItemType::Integer => {
                let bytes = self.var_bytes("integer size", limits.max_big_integer_size)?;
                Ok(StackItem::Integer(BigInt::from_signed_bytes_le(bytes)))
            }
            StackItemType::InteropInterface => {
                Err(VmError::NotSerializable(StackItemType::InteropInterface))
            }
            kind @ (StackItemType::Array | StackItemType::Struct) => {
                let count = self.bounded_len("element count", limits.max_array_size)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.item(limits, depth + 1)?);
                }
                Ok(if kind == StackItemType::Array {
                    StackItem::new_array(items)
                } else {
                    StackItem::new_struct(items)
                })
            }
            StackItemType::Map => {
                let count = self.bounded_len("map size", limits.max_array_size)?;
                let mut entries = MapItems::new();
                for _ in 0..count {
                    let key = self.item(limits, depth + 1)?;
                    let value = self.item(limits, depth + 1)?;
                    entries.insert(key, value);
                }
                Ok(StackItem::Map(Claim::new(entries)))
            }
        }
    }
}

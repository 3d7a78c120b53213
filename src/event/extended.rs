use alloc::{sync::Arc, vec::Vec};
use core::fmt;

/// Buffer capacity is rounded up to this many bytes
pub const EXTENDED_QUANTUM: usize = 16;

const fn quantize(len: usize) -> usize {
    len.div_ceil(EXTENDED_QUANTUM) * EXTENDED_QUANTUM
}

#[doc = r#"
The out-of-line payload of a [`SysEx`](super::EventKind::SysEx) or
[`Text`](super::EventKind::Text) event.

The buffer is shared: cloning an event shares the same allocation and bumps
its use count, dropping an event releases its share, and the last share frees
the bytes. Mutation copies the bytes first if they are shared.

# Example
```rust
# use midiseq::event::ExtendedData;
let data = ExtendedData::from_bytes(&[0x43, 0x12]);
let copy = data.clone();
assert_eq!(data.use_count(), 2);
drop(copy);
assert_eq!(data.use_count(), 1);
```
"#]
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedData(Arc<Vec<u8>>);

impl ExtendedData {
    /// Copy `bytes` into a new buffer
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(quantize(bytes.len()));
        buf.extend_from_slice(bytes);
        Self(Arc::new(buf))
    }

    /// The payload
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Mutable access, copying the bytes if the buffer is shared
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.0).as_mut_slice()
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no payload bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bytes reserved for the payload, always a multiple of 16
    pub fn capacity(&self) -> usize {
        quantize(self.0.capacity())
    }

    /// Resize the payload, zero-filling any new bytes.
    pub fn set_len(&mut self, len: usize) {
        let buf = Arc::make_mut(&mut self.0);
        if len > buf.capacity() {
            buf.reserve_exact(quantize(len) - buf.len());
        }
        buf.resize(len, 0);
    }

    /// How many events currently share this buffer
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl From<Vec<u8>> for ExtendedData {
    fn from(mut value: Vec<u8>) -> Self {
        let wanted = quantize(value.len());
        if value.capacity() < wanted {
            value.reserve_exact(wanted - value.len());
        }
        Self(Arc::new(value))
    }
}

impl fmt::Debug for ExtendedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedData({:02X?})", self.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capacity_is_quantized() {
        let mut data = ExtendedData::from_bytes(&[1, 2, 3]);
        assert_eq!(data.capacity(), 16);
        data.set_len(17);
        assert_eq!(data.len(), 17);
        assert_eq!(data.capacity(), 32);
        assert_eq!(&data.as_slice()[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn writes_copy_shared_buffers() {
        let mut original = ExtendedData::from_bytes(b"abc");
        let shared = original.clone();
        assert_eq!(original.use_count(), 2);

        original.as_mut_slice()[0] = b'x';
        assert_eq!(original.as_slice(), b"xbc");
        assert_eq!(shared.as_slice(), b"abc");
        assert_eq!(original.use_count(), 1);
        assert_eq!(shared.use_count(), 1);
    }
}

#![doc = r#"
Variable length quantities and fixed-width 7-bit fields.

# Variable length quantities

SMF delta-times and lengths are written 7 bits per byte, most significant
group first. Every byte except the last has bit 7 set:

```text
0x00000000  00
0x0000007F  7F
0x00000080  81 00
0x00003FFF  FF 7F
0x0FFFFFFF  FF FF FF 7F
```

At most four bytes (28 bits) are allowed.

# Fixed-width fields

The native event list packs bounded integers into a fixed number of 7-bit
groups, chosen from the largest value the field can hold. Every byte keeps
bit 7 clear, which is what lets a decoder resynchronise on command bytes.
"#]

use crate::{
    VlqError, WriteError,
    reader::{ReadResult, Reader, inv_data},
};
use alloc::vec::Vec;

/// The largest value a variable length quantity can carry
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Decode a variable length quantity.
///
/// Fails with an out of bounds error if the input ends mid-sequence.
pub fn read_vlq(reader: &mut Reader<'_>) -> ReadResult<u32> {
    let mut value: u32 = 0;
    for _ in 0..4 {
        let byte = reader.read_u8()?;
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(inv_data(reader, VlqError::Overflow))
}

/// Encode a variable length quantity.
pub fn write_vlq(out: &mut Vec<u8>, value: u32) -> Result<(), WriteError> {
    if value > VLQ_MAX {
        return Err(WriteError::VlqOverflow(value));
    }
    let mut started = false;
    for shift in [21, 14, 7] {
        let group = (value >> shift) & 0x7F;
        if started || group != 0 {
            out.push(group as u8 | 0x80);
            started = true;
        }
    }
    out.push((value & 0x7F) as u8);
    Ok(())
}

/// The number of bytes `value` occupies as a variable length quantity
pub const fn vlq_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// The number of 7-bit groups needed to hold `ceiling`
pub const fn fixed_width(ceiling: u32) -> usize {
    let bits = 32 - ceiling.leading_zeros() as usize;
    if bits == 0 { 1 } else { bits.div_ceil(7) }
}

/// Write `value` as exactly [`fixed_width(ceiling)`](fixed_width) 7-bit groups.
///
/// Values above the ceiling are clamped to it.
pub fn write_fixed(out: &mut Vec<u8>, value: u32, ceiling: u32) {
    let value = value.min(ceiling);
    for group in (0..fixed_width(ceiling)).rev() {
        out.push(((value as u64 >> (group * 7)) & 0x7F) as u8);
    }
}

/// Read a field written by [`write_fixed`] with the same ceiling
pub fn read_fixed(reader: &mut Reader<'_>, ceiling: u32) -> ReadResult<u32> {
    let mut value: u64 = 0;
    for _ in 0..fixed_width(ceiling) {
        let byte = reader.read_u8()?;
        if byte & 0x80 != 0 {
            return Err(inv_data(reader, VlqError::FixedField(byte)));
        }
        value = (value << 7) | byte as u64;
    }
    Ok(value.min(ceiling as u64) as u32)
}

//! Little endian packing with explicit widths.

use crate::EncodingError;

/// # Put Little Endian
///
/// Appends `value` to `out` as a `width`-byte little endian integer. Fails with
/// [`EncodingError::Overflow`] instead of truncating when the value does not fit.
pub fn put_le(
    out: &mut Vec<u8>,
    field: &'static str,
    value: u128,
    width: usize,
) -> Result<(), EncodingError> {
    let overflow = EncodingError::Overflow {
        field,
        value,
        width,
    };
    if width > 16 {
        return Err(overflow);
    }
    if width < 16 && value >> (width * 8) != 0 {
        return Err(overflow);
    }
    out.extend_from_slice(&value.to_le_bytes()[..width]);
    Ok(())
}

/// Length of a variable field, checked against the declared width.
pub fn put_len(
    out: &mut Vec<u8>,
    field: &'static str,
    len: usize,
    width: usize,
) -> Result<(), EncodingError> {
    put_le(out, field, len as u128, width)
}

/// Converts a length into a `u16` offset field.
pub fn to_u16(field: &'static str, value: usize) -> Result<u16, EncodingError> {
    u16::try_from(value).map_err(|_| EncodingError::Overflow {
        field,
        value: value as u128,
        width: 2,
    })
}

/// # Reader
///
/// Cursor over encoded bytes; every read names the field it decodes so that a
/// short buffer reports where it ended.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], EncodingError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(EncodingError::Truncated { field })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], EncodingError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N, field)?);
        Ok(buf)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, EncodingError> {
        self.array::<1>(field).map(|b| b[0])
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32, EncodingError> {
        self.array(field).map(u32::from_le_bytes)
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64, EncodingError> {
        self.array(field).map(u64::from_le_bytes)
    }

    /// Reads a length written as `u64` and the bytes that follow it.
    pub fn sized(&mut self, field: &'static str) -> Result<&'a [u8], EncodingError> {
        let len = self.u64(field)?;
        let len = usize::try_from(len).map_err(|_| EncodingError::Truncated { field })?;
        self.take(len, field)
    }

    /// Everything not consumed yet.
    pub fn rest_is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

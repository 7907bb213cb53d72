//! Minimal XDR (RFC 4506) writer for the ledger structures the wallet emits.
//!
//! All quantities are big-endian and every item is padded to a 4-byte boundary.

use crate::errors::{WalletError, WalletResult};

/// Types that have a canonical XDR encoding
pub trait ToXdr {
    fn write_xdr(&self, out: &mut XdrWriter) -> WalletResult<()>;

    fn to_xdr(&self) -> WalletResult<Vec<u8>> {
        let mut writer = XdrWriter::new();
        self.write_xdr(&mut writer)?;
        Ok(writer.into_bytes())
    }
}

#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(u32::from(value));
    }

    /// Fixed-length opaque data: raw bytes plus padding
    pub fn write_fixed_opaque(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.pad(data.len());
    }

    /// Variable-length opaque data bounded by `max_len`
    pub fn write_var_opaque(&mut self, data: &[u8], max_len: usize) -> WalletResult<()> {
        if data.len() > max_len {
            return Err(WalletError::ValidationError(format!(
                "XDR opaque of {} bytes exceeds limit of {}",
                data.len(),
                max_len
            )));
        }
        let len = u32::try_from(data.len())
            .map_err(|_| WalletError::ValidationError("XDR opaque too long".to_string()))?;
        self.write_u32(len);
        self.write_fixed_opaque(data);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str, max_len: usize) -> WalletResult<()> {
        self.write_var_opaque(value.as_bytes(), max_len)
    }

    /// Variable-length array: count followed by each element
    pub fn write_array<T: ToXdr>(&mut self, items: &[T], max_len: usize) -> WalletResult<()> {
        if items.len() > max_len {
            return Err(WalletError::ValidationError(format!(
                "XDR array of {} items exceeds limit of {}",
                items.len(),
                max_len
            )));
        }
        let len = u32::try_from(items.len())
            .map_err(|_| WalletError::ValidationError("XDR array too long".to_string()))?;
        self.write_u32(len);
        for item in items {
            item.write_xdr(self)?;
        }
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn pad(&mut self, written: usize) {
        let padding = (4 - written % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(padding));
    }
}

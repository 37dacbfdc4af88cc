use crate::types::Error;
use crate::types::Result;
use crate::types::Tag;

/// A growable buffer that encodes values into the ytpack format.
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    #[inline(always)]
    fn write_tag(&mut self, tag: Tag) {
        self.buf.push(tag as u8);
    }

    #[inline(always)]
    fn write_u32_raw(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_blob(&mut self, tag: Tag, data: &[u8]) -> Result<()> {
        if data.len() > u32::MAX as usize {
            return Err(Error::BlobTooLarge(data.len()));
        }
        self.write_tag(tag);
        self.write_u32_raw(data.len() as u32);
        self.buf.extend_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn unit(&mut self) -> Result<&mut Self> {
        self.write_tag(Tag::Unit);
        Ok(self)
    }

    #[inline]
    pub fn bool(&mut self, v: bool) -> Result<&mut Self> {
        self.write_tag(Tag::Bool);
        self.buf.push(v as u8);
        Ok(self)
    }

    #[inline]
    pub fn i32(&mut self, v: i32) -> Result<&mut Self> {
        self.write_tag(Tag::S32);
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(self)
    }

    #[inline]
    pub fn i64(&mut self, v: i64) -> Result<&mut Self> {
        self.write_tag(Tag::S64);
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(self)
    }

    #[inline]
    pub fn f64(&mut self, v: f64) -> Result<&mut Self> {
        self.write_tag(Tag::F64);
        self.buf.extend_from_slice(&v.to_le_bytes());
        Ok(self)
    }

    pub fn str(&mut self, v: &str) -> Result<&mut Self> {
        self.write_blob(Tag::Str, v.as_bytes())?;
        Ok(self)
    }

    pub fn bytes(&mut self, v: &[u8]) -> Result<&mut Self> {
        self.write_blob(Tag::Bytes, v)?;
        Ok(self)
    }

    /// Begin a list of exactly `len` values. The caller must write `len`
    /// complete values after this call.
    pub fn list(&mut self, len: usize) -> Result<&mut Self> {
        if len > u32::MAX as usize {
            return Err(Error::BlobTooLarge(len));
        }
        self.write_tag(Tag::List);
        self.write_u32_raw(len as u32);
        Ok(self)
    }

    /// Write an Option::None discriminant. A complete value in itself.
    pub fn option_none(&mut self) -> Result<&mut Self> {
        self.write_tag(Tag::OptionNone);
        Ok(self)
    }

    /// Write an Option::Some discriminant. The caller must write exactly one
    /// value after this call.
    pub fn option_some(&mut self) -> Result<&mut Self> {
        self.write_tag(Tag::OptionSome);
        Ok(self)
    }

    /// Write a variant discriminant with its name. The caller must write
    /// exactly one payload value after this call (use `unit` for payload-free
    /// variants).
    pub fn variant(&mut self, name: &str) -> Result<&mut Self> {
        self.write_tag(Tag::Variant);
        let name_bytes = name.as_bytes();
        if name_bytes.len() > u32::MAX as usize {
            return Err(Error::BlobTooLarge(name_bytes.len()));
        }
        self.write_u32_raw(name_bytes.len() as u32);
        self.buf.extend_from_slice(name_bytes);
        Ok(self)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

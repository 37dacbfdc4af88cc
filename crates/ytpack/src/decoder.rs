use crate::types::Error;
use crate::types::Result;
use crate::types::Tag;

/// A cursor over an encoded buffer that decodes values in order.
///
/// Borrowed data (`str`, `bytes`) points into the input slice.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Declare the input fully consumed. Errors if bytes are left over.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEnd);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Look at the next tag without consuming it.
    pub fn peek_tag(&self) -> Result<Tag> {
        let b = *self.buf.get(self.pos).ok_or(Error::UnexpectedEnd)?;
        Tag::from_u8(b).ok_or(Error::InvalidTag(b))
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let tag = self.peek_tag()?;
        self.pos += 1;
        Ok(tag)
    }

    fn expect(&mut self, expected: Tag) -> Result<()> {
        let found = self.read_tag()?;
        if found != expected {
            return Err(Error::TypeMismatch { expected, found });
        }
        Ok(())
    }

    fn read_u32_raw(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_blob(&mut self, tag: Tag) -> Result<&'a [u8]> {
        self.expect(tag)?;
        let len = self.read_u32_raw()? as usize;
        self.take(len)
    }

    pub fn unit(&mut self) -> Result<()> {
        self.expect(Tag::Unit)
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.expect(Tag::Bool)?;
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::Malformed),
        }
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.expect(Tag::S32)?;
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn i64(&mut self) -> Result<i64> {
        self.expect(Tag::S64)?;
        let bytes = self.take(8)?;
        Ok(i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    pub fn f64(&mut self) -> Result<f64> {
        self.expect(Tag::F64)?;
        let bytes = self.take(8)?;
        Ok(f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    pub fn str(&mut self) -> Result<&'a str> {
        let blob = self.read_blob(Tag::Str)?;
        std::str::from_utf8(blob).map_err(|_| Error::InvalidUtf8)
    }

    pub fn bytes(&mut self) -> Result<&'a [u8]> {
        self.read_blob(Tag::Bytes)
    }

    /// Read a list header and return the element count. The caller must
    /// decode that many values next.
    pub fn list(&mut self) -> Result<usize> {
        self.expect(Tag::List)?;
        Ok(self.read_u32_raw()? as usize)
    }

    /// Read an option discriminant. Returns `true` if a payload value
    /// follows.
    pub fn option(&mut self) -> Result<bool> {
        match self.read_tag()? {
            Tag::OptionSome => Ok(true),
            Tag::OptionNone => Ok(false),
            found => Err(Error::TypeMismatch { expected: Tag::OptionSome, found }),
        }
    }

    /// Read a variant discriminant and return its name. The payload value
    /// follows.
    pub fn variant(&mut self) -> Result<&'a str> {
        self.expect(Tag::Variant)?;
        let len = self.read_u32_raw()? as usize;
        let name = self.take(len)?;
        std::str::from_utf8(name).map_err(|_| Error::InvalidUtf8)
    }
}

use bytes::Buf;

use crate::error::ParcelShpError;

/// Wrapper around a buffer that checks the length of the remaining data before every read and keeps track of the
/// position, so that decoding errors can point at the place they happened.
pub(crate) struct ShpReader<B> {
    buf: B,
    total: usize,
    record: Option<usize>,
}

impl<B: Buf> ShpReader<B> {
    pub(crate) fn new(buf: B) -> Self {
        let total = buf.remaining();
        Self {
            buf,
            total,
            record: None,
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.total - self.buf.remaining()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Sets the index of the record the following errors are reported for.
    pub(crate) fn set_record(&mut self, record: Option<usize>) {
        self.record = record;
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> ParcelShpError {
        self.malformed_at(self.offset(), reason)
    }

    pub(crate) fn malformed_at(&self, offset: usize, reason: impl Into<String>) -> ParcelShpError {
        ParcelShpError::Malformed {
            offset,
            record: self.record,
            reason: reason.into(),
        }
    }

    pub(crate) fn ensure(&self, len: usize, what: &str) -> Result<(), ParcelShpError> {
        if self.buf.remaining() < len {
            Err(self.malformed(format!(
                "unexpected end of data reading {what}: need {len} bytes, {} left",
                self.buf.remaining()
            )))
        } else {
            Ok(())
        }
    }

    pub(crate) fn read_i32_be(&mut self, what: &str) -> Result<i32, ParcelShpError> {
        self.ensure(4, what)?;
        Ok(self.buf.get_i32())
    }

    pub(crate) fn read_i32_le(&mut self, what: &str) -> Result<i32, ParcelShpError> {
        self.ensure(4, what)?;
        Ok(self.buf.get_i32_le())
    }

    pub(crate) fn read_f64_le(&mut self, what: &str) -> Result<f64, ParcelShpError> {
        self.ensure(8, what)?;
        Ok(self.buf.get_f64_le())
    }

    /// Reads a count field: a little-endian integer that must not be negative.
    pub(crate) fn read_count(&mut self, what: &str) -> Result<usize, ParcelShpError> {
        let offset = self.offset();
        let value = self.read_i32_le(what)?;
        usize::try_from(value).map_err(|_| self.malformed_at(offset, format!("negative {what}: {value}")))
    }

    pub(crate) fn skip(&mut self, len: usize, what: &str) -> Result<(), ParcelShpError> {
        self.ensure(len, what)?;
        self.buf.advance(len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reads_track_offset() {
        let data: &[u8] = &[0, 0, 0, 7, 7, 0, 0, 0, 1];
        let mut reader = ShpReader::new(data);

        assert_eq!(reader.read_i32_be("a"), Ok(7));
        assert_eq!(reader.offset(), 4);
        assert_eq!(reader.read_i32_le("b"), Ok(7));
        assert_eq!(reader.remaining(), 1);

        reader.set_record(Some(3));
        assert_matches!(
            reader.read_f64_le("c"),
            Err(ParcelShpError::Malformed {
                offset: 8,
                record: Some(3),
                ..
            })
        );
    }

    #[test]
    fn negative_count() {
        let data: &[u8] = &(-2i32).to_le_bytes();
        let mut reader = ShpReader::new(data);
        assert_matches!(
            reader.read_count("number of parts"),
            Err(ParcelShpError::Malformed { offset: 0, .. })
        );
    }
}

//! The seekable byte source a package is read from.

/// A seekable byte source.
///
/// Firmware implements this over whatever storage holds the package (SPI
/// flash, SD card); hosts can use [`SliceSource`] over a loaded file. The
/// contract: `read` returns how many bytes it produced, with a short count
/// meaning end of source; `seek` positions the cursor absolutely and returns
/// `false` when the position is past the end. After one successful seek,
/// sequential reads must succeed across the declared file size.
pub trait ByteSource {
    /// Read up to `dst.len()` bytes into `dst`, returning the count.
    fn read(&mut self, dst: &mut [u8]) -> usize;

    /// Seek to an absolute offset; `false` if the offset is past the end.
    fn seek(&mut self, position: u32) -> bool;
}

/// A byte source over an in-memory slice.
#[derive(Debug)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Wrap a byte slice.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Total length of the underlying slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the underlying slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, dst: &mut [u8]) -> usize {
        let remaining = &self.bytes[self.position.min(self.bytes.len())..];
        let n = dst.len().min(remaining.len());
        dst[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        n
    }

    fn seek(&mut self, position: u32) -> bool {
        let position = position as usize;
        if position > self.bytes.len() {
            return false;
        }
        self.position = position;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_seeks() {
        let data = [1u8, 2, 3, 4, 5];
        let mut source = SliceSource::new(&data);

        let mut buf = [0u8; 3];
        assert_eq!(source.read(&mut buf), 3);
        assert_eq!(buf, [1, 2, 3]);

        assert!(source.seek(1));
        assert_eq!(source.read(&mut buf), 3);
        assert_eq!(buf, [2, 3, 4]);
    }

    #[test]
    fn short_read_at_end() {
        let data = [9u8; 4];
        let mut source = SliceSource::new(&data);
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf), 4);
        assert_eq!(source.read(&mut buf), 0);
    }

    #[test]
    fn seek_past_end_fails() {
        let data = [0u8; 4];
        let mut source = SliceSource::new(&data);
        assert!(source.seek(4));
        assert!(!source.seek(5));
    }
}

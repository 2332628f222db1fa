use serde::Serialize;

/// Half-open byte range `[start, end)` into a request buffer.
///
/// Spans are plain offsets; they only become bytes when resolved against the
/// buffer that produced them, so they can never dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub(crate) const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Resolve the span against `buf`. Returns `None` if the span does not
    /// fit inside `buf`.
    pub fn get<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.start..self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inside_buffer() {
        let buf = b"GET / HTTP/1.1";
        let span = Span::new(4, 5);
        assert_eq!(span.len(), 1);
        assert_eq!(span.get(buf), Some(&b"/"[..]));
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(Span::new(2, 10).get(b"abc"), None);
        assert!(Span::new(3, 3).is_empty());
    }
}

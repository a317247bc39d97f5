/// A cursor over a byte array (a read-only take on [`std::io::Cursor`])
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor<T> {
  t: T,
  cursor: usize,
}

impl<T: AsRef<[u8]>> Cursor<T> {
  /// Creates a new cursor
  pub fn new(t: T) -> Cursor<T> {
    Cursor { t, cursor: 0 }
  }

  /// Take the next byte in the cursor, returning None
  /// if the cursor is exhausted.
  pub fn next(&mut self) -> Option<u8> {
    self.take_exact(1).map(|a| a[0])
  }

  /// Take `n` bytes from the cursor, stopping early if
  /// the end of the buffer is encountered.
  pub fn take(&mut self, n: usize) -> &[u8] {
    let n = n.min(self.remaining());
    let start = self.cursor;
    self.cursor += n;
    &self.t.as_ref()[start..start + n]
  }

  /// Take `n` bytes from the cursor, returning None if
  /// the end of the buffer is encountered.
  ///
  /// The position is not advanced when this returns None.
  pub fn take_exact(&mut self, n: usize) -> Option<&[u8]> {
    if n > self.remaining() {
      None
    } else {
      Some(self.take(n))
    }
  }

  /// Without advancing the position, look at the next
  /// byte.
  pub fn peek_byte(&self) -> Option<u8> {
    self.t.as_ref().get(self.cursor).copied()
  }

  /// Consume all remaining bytes
  pub fn take_until_end(&mut self) -> &[u8] {
    self.take(self.remaining())
  }

  /// Whether the cursor has reached the end
  /// of the buffer.
  pub fn is_exhausted(&self) -> bool {
    self.remaining() == 0
  }

  /// The number of bytes not yet consumed
  pub fn remaining(&self) -> usize {
    self.t.as_ref().len() - self.cursor
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn next() {
    let mut cur = Cursor::new([1, 2]);
    assert_eq!(cur.next(), Some(1));
    assert_eq!(cur.next(), Some(2));
    assert_eq!(cur.next(), None);
  }

  #[test]
  fn take() {
    let mut cur = Cursor::new([1, 2, 3]);
    assert_eq!(cur.take(2), &[1, 2]);
    assert_eq!(cur.take(2), &[3]);
    assert_eq!(cur.take(2), &[] as &[u8]);
    assert!(cur.is_exhausted());
  }

  #[test]
  fn take_exact() {
    let mut cur = Cursor::new([1, 2, 3]);
    assert_eq!(cur.take_exact(4), None);
    assert_eq!(cur.remaining(), 3);
    assert_eq!(cur.take_exact(3), Some(&[1u8, 2, 3][..]));
    assert!(cur.is_exhausted());
  }

  #[test]
  fn peek_and_remaining() {
    let mut cur = Cursor::new(vec![9, 8]);
    assert_eq!(cur.peek_byte(), Some(9));
    assert_eq!(cur.remaining(), 2);
    cur.next();
    assert_eq!(cur.take_until_end(), &[8]);
    assert_eq!(cur.peek_byte(), None);
  }
}

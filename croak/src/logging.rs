use core::fmt::Debug;

use croak_msg::Message;

/// Target of every record `croak` logs through [`Log`]
pub const TARGET: &str = "croak";

/// Somewhere log messages can be sent.
///
/// Components that log capture a `Sink` when they are built
/// instead of reaching for a global logger, so the same router
/// can log to the process logger in the binary and to a buffer in tests.
pub trait Sink: Debug + Send + Sync {
  /// Record a message at some level
  fn log(&self, level: log::Level, msg: &str);
}

/// [`Sink`] that forwards to the [`log`] facade
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

impl Sink for Log {
  fn log(&self, level: log::Level, msg: &str) {
    log::log!(target: TARGET, level, "{}", msg);
  }
}

/// Short human-readable description of a message
///
/// ```
/// use croak::logging::msg_summary;
/// use croak_msg::*;
///
/// let mut msg = Message::new(Type::Con, Code::new(0, 1), Id(1), Token(Default::default()));
/// msg.add(Opt::new(known::URI_PATH, "Hello"));
///
/// assert_eq!(msg_summary(&msg), "0.01 Con /Hello with 0 byte payload");
/// ```
pub fn msg_summary(msg: &Message) -> String {
  let path = match msg.path_segments() {
    | Ok(segs) => format!("/{}", segs.join("/")),
    | Err(_) => String::from("<invalid path>"),
  };

  format!("{} {:?} {} with {} byte payload",
          msg.code,
          msg.ty,
          path,
          msg.payload.0.len())
}

#[cfg(test)]
mod tests {
  use croak_msg::*;

  use super::*;

  #[test]
  fn summary_of_response() {
    let mut msg = Message::new(Type::Ack, Code::new(2, 5), Id(1), Token(Default::default()));
    msg.payload = Payload(b"hello world".to_vec());

    assert_eq!(msg_summary(&msg), "2.05 Ack / with 11 byte payload");
  }

  #[test]
  fn summary_with_undecodable_path() {
    let mut msg = Message::new(Type::Non, Code::new(0, 1), Id(1), Token(Default::default()));
    msg.add(Opt::new(known::URI_PATH, vec![0xFFu8]));

    assert!(msg_summary(&msg).contains("<invalid path>"));
  }
}

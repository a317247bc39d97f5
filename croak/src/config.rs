use core::ops::Add;
use core::time::Duration;

/// A number of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempts(pub u16);

impl Add for Attempts {
  type Output = Attempts;

  fn add(self, rhs: Self) -> Self::Output {
    Attempts(self.0.saturating_add(rhs.0))
  }
}

/// What to do with requests that no route matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unmatched {
  /// Log the request and send nothing back
  Ignore,
  /// Respond 4.04 Not Found
  NotFound,
}

/// Configuration options related to building & parsing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msg {
  /// Size of the scratch buffer that response options are
  /// first encoded into.
  ///
  /// When the options do not fit, the buffer grows by exactly
  /// the number of bytes the encoder reports missing and encoding
  /// is attempted again.
  ///
  /// Defaults to 32 bytes.
  ///
  /// ```
  /// use croak::config::Msg;
  ///
  /// assert_eq!(Msg::default().opt_buffer_size, 32);
  /// ```
  pub opt_buffer_size: usize,

  /// Number of times we are allowed to try encoding a response's
  /// options (including the first try) before giving up on the response.
  ///
  /// Encoding is always tried at least once, so `Attempts(0)` acts as `Attempts(1)`.
  ///
  /// Defaults to 3 attempts.
  ///
  /// ```
  /// use croak::config::{Attempts, Msg};
  ///
  /// assert_eq!(Msg::default().max_encode_attempts, Attempts(3));
  /// ```
  pub max_encode_attempts: Attempts,

  /// Size of the buffer datagrams are received into.
  ///
  /// Bytes beyond this are dropped by the socket.
  ///
  /// Defaults to 1152, the maximum message size recommended by RFC7252.
  ///
  /// ```
  /// use croak::config::Msg;
  ///
  /// assert_eq!(Msg::default().recv_buffer_size, 1152);
  /// ```
  pub recv_buffer_size: usize,
}

impl Default for Msg {
  fn default() -> Self {
    Msg { opt_buffer_size: 32,
          max_encode_attempts: Attempts(3),
          recv_buffer_size: 1152 }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Msg`]
  pub msg: Msg,

  /// Number of threads receiving & handling requests.
  ///
  /// Each datagram is handled start to finish by whichever worker received it.
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().workers, 4);
  /// ```
  pub workers: u8,

  /// See [`Unmatched`]
  ///
  /// ```
  /// use croak::config::{Config, Unmatched};
  ///
  /// assert_eq!(Config::default().unmatched, Unmatched::Ignore);
  /// ```
  pub unmatched: Unmatched,

  /// How long a worker waits for a datagram before checking
  /// whether the server is shutting down.
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert_eq!(Config::default().poll_interval_millis, 100);
  /// ```
  pub poll_interval_millis: u64,
}

impl Default for Config {
  fn default() -> Self {
    Config { msg: Msg::default(),
             workers: 4,
             unmatched: Unmatched::Ignore,
             poll_interval_millis: 100 }
  }
}

impl Config {
  pub(crate) fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_millis.max(1))
  }
}

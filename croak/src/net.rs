use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Data that came from (or is headed to) a network socket
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Addrd<T>(pub T, pub SocketAddr);

impl<T> Addrd<T> {
  /// Borrow the contents of this Addressed
  pub fn as_ref(&self) -> Addrd<&T> {
    Addrd(self.data(), self.addr())
  }

  /// Discard the socket and get the data in this Addressed
  pub fn unwrap(self) -> T {
    self.0
  }

  /// Map the data contained in this Addressed
  pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Addrd<R> {
    Addrd(f(self.0), self.1)
  }

  /// Borrow the contents of the addressed item
  pub fn data(&self) -> &T {
    &self.0
  }

  /// Mutably borrow the contents of the addressed item
  pub fn data_mut(&mut self) -> &mut T {
    &mut self.0
  }

  /// Copy the socket address for the data
  pub fn addr(&self) -> SocketAddr {
    self.1
  }
}

impl<T> AsMut<T> for Addrd<T> {
  fn as_mut(&mut self) -> &mut T {
    &mut self.0
  }
}

/// A datagram socket that CoAP messages are exchanged over
///
/// [`Socket::recv`] should not block forever; when no datagram arrives
/// within a reasonable amount of time it yields [`nb::Error::WouldBlock`],
/// which is how server workers find a chance to notice they should stop.
pub trait Socket: Sized + Send + Sync {
  /// The error yielded by socket operations
  type Error: core::fmt::Debug;

  /// Bind the socket to an address.
  ///
  /// If `addr` yields multiple addresses the first one that
  /// can be bound to is used.
  fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, Self::Error>;

  /// Get the local address this socket is bound to
  fn local_addr(&self) -> Result<SocketAddr, Self::Error>;

  /// Send a datagram to a remote address
  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error>;

  /// Pull a buffered datagram from the socket, along with the address of the sender.
  ///
  /// Like [`std::net::UdpSocket`], if the datagram is larger
  /// than the buffer the remaining bytes are dropped and this is not considered an error.
  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error>;

  /// Change how long [`Socket::recv`] may wait before yielding [`nb::Error::WouldBlock`]
  fn set_recv_timeout(&self, timeout: Duration) -> Result<(), Self::Error>;
}

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    // a read timeout shows up as `TimedOut` on some platforms
    | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// How long [`UdpSocket::recv`](Socket::recv) waits for a datagram
/// until [`Socket::set_recv_timeout`] says otherwise
pub const RECV_TIMEOUT: Duration = Duration::from_millis(100);

impl Socket for UdpSocket {
  type Error = io::Error;

  fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
    let sock = UdpSocket::bind(addr)?;
    sock.set_read_timeout(Some(RECV_TIMEOUT))?;
    Ok(sock)
  }

  fn local_addr(&self) -> io::Result<SocketAddr> {
    UdpSocket::local_addr(self)
  }

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), io::Error> {
    self.send_to(msg.data(), msg.addr())
        .map(|_| ())
        .map_err(io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, io::Error> {
    self.recv_from(buffer)
        .map(|(n, addr)| Addrd(n, addr))
        .map_err(io_to_nb)
  }

  fn set_recv_timeout(&self, timeout: Duration) -> io::Result<()> {
    self.set_read_timeout(Some(timeout))
  }
}

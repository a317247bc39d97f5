#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use croak_msg::opt::OptEncodeError;
use croak_msg::{ContentFormat, Message, Opt, Token, TryFromBytes, TryIntoBytes};

use crate::logging::Sink;
use crate::net::{Addrd, Socket};
use crate::req::Req;
use crate::resp::builder::{Builder, Encoder};
use crate::resp::{code, Resp};
use crate::server::Error;

/// The address every mocked client sends from
pub fn addr() -> SocketAddr {
  "192.168.0.1:5683".parse().unwrap()
}

/// A request from [`addr`]
pub fn req(req: Req) -> Addrd<Req> {
  Addrd(req, addr())
}

pub fn with_token(mut req: Addrd<Req>, token: &[u8]) -> Addrd<Req> {
  req.data_mut()
     .set_msg_token(Token::try_from_slice(token).unwrap());
  req
}

/// Handler that answers 2.05 with the request's payload
pub fn echo(req: &Addrd<Req>) -> Result<Addrd<Resp>, Error> {
  let payload = req.data().payload().to_vec();
  Builder::default().build(req, code::CONTENT, ContentFormat::OctetStream, payload)
                    .map_err(Error::from)
}

/// Option encoder that always claims to need one more byte
#[derive(Debug, Default)]
pub struct Liar {
  pub calls: AtomicUsize,
}

impl Encoder for Liar {
  fn encode<'a>(&self, _: &'a mut [u8], _: &[Opt]) -> Result<&'a [u8], OptEncodeError> {
    self.calls.fetch_add(1, Ordering::Relaxed);
    Err(OptEncodeError::TooSmall { needed: 1 })
  }
}

/// Log sink that remembers everything logged to it
#[derive(Debug, Default)]
pub struct Capture(pub Mutex<Vec<(log::Level, String)>>);

impl Capture {
  pub fn lines(&self) -> Vec<(log::Level, String)> {
    self.0.lock().unwrap().clone()
  }

  pub fn contains(&self, level: log::Level, needle: &str) -> bool {
    self.lines()
        .iter()
        .any(|(lvl, line)| *lvl == level && line.contains(needle))
  }
}

impl Sink for Capture {
  fn log(&self, level: log::Level, msg: &str) {
    self.0.lock().unwrap().push((level, msg.to_string()));
  }
}

/// A sink nobody looks at
pub fn sink() -> Arc<dyn Sink> {
  Arc::new(Capture::default())
}

/// A mocked socket
#[derive(Debug, Clone, Default)]
pub struct SockMock {
  /// Inbound bytes from remote sockets. Address represents the sender
  pub rx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
  /// Outbound bytes to remote sockets. Address represents the destination
  pub tx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
  /// Number of upcoming sends that will fail
  pub failing_sends: Arc<AtomicUsize>,
}

impl SockMock {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make the next `n` sends fail
  pub fn fail_sends(&self, n: usize) {
    self.failing_sends.store(n, Ordering::SeqCst);
  }

  /// Queue a message as if `addr` had sent it
  pub fn send_msg(&self, msg: Addrd<Message>) {
    self.rx
        .lock()
        .unwrap()
        .push(msg.map(|msg| msg.try_into_bytes().unwrap()));
  }

  /// Queue raw bytes as if `addr` had sent them
  pub fn send_bytes(&self, bytes: Addrd<Vec<u8>>) {
    self.rx.lock().unwrap().push(bytes);
  }

  /// Everything that has been sent, parsed
  pub fn sent(&self) -> Vec<Addrd<Message>> {
    self.tx
        .lock()
        .unwrap()
        .iter()
        .map(|Addrd(bytes, addr)| Addrd(Message::try_from_bytes(bytes).unwrap(), *addr))
        .collect()
  }
}

impl Socket for SockMock {
  type Error = Option<()>;

  fn bind<A: std::net::ToSocketAddrs>(_: A) -> Result<Self, Self::Error> {
    Ok(Self::new())
  }

  fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
    Ok("0.0.0.0:5683".parse().unwrap())
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    let mut rx = self.rx.lock().unwrap();

    if rx.is_empty() {
      return Err(nb::Error::WouldBlock);
    }

    let dgram = rx.remove(0);
    let n = dgram.data().len().min(buf.len());
    buf[..n].copy_from_slice(&dgram.data()[..n]);

    Ok(dgram.map(|_| n))
  }

  fn send(&self, buf: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    let failing = self.failing_sends
                      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    if failing.is_ok() {
      return Err(nb::Error::Other(None));
    }

    self.tx.lock().unwrap().push(buf.map(Vec::from));
    Ok(())
  }

  fn set_recv_timeout(&self, _: Duration) -> Result<(), Self::Error> {
    Ok(())
  }
}

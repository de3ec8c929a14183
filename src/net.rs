//! Client side of the transport: dial, greeting, one frame, close.

use std::io::{ErrorKind, Read};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::TransferConfig;
use crate::error::{Result, TransferError};
use crate::frame::Frame;
use crate::header::FileHeader;
use crate::protocol::MAX_GREETING;

/// One client connection to the receiving service; carries exactly one file.
#[derive(Debug)]
pub struct Connection {
    stream: Option<TcpStream>,
    peer: String,
    greeting: String,
}

impl Connection {
    /// Dial the configured remote and wait for its greeting.
    pub fn connect(cfg: &TransferConfig) -> Result<Self> {
        let addr = cfg.remote.to_string();
        let stream = dial(&addr, cfg.connect_timeout)?;
        tune_socket(&stream, cfg.io_timeout)?;
        Self::handshake(stream, addr)
    }

    /// Read the greeting through its first newline, capped at `MAX_GREETING` bytes.
    ///
    /// Once some bytes have arrived, EOF or a read timeout ends the greeting early.
    fn handshake(mut stream: TcpStream, peer: String) -> Result<Self> {
        let mut buf = Vec::with_capacity(MAX_GREETING);
        let mut chunk = [0u8; MAX_GREETING];
        while !buf.contains(&b'\n') && buf.len() < MAX_GREETING {
            let room = MAX_GREETING - buf.len();
            match stream.read(&mut chunk[..room]) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e)
                    if !buf.is_empty()
                        && matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    break
                }
                Err(e) => {
                    let _ = stream.shutdown(Shutdown::Both);
                    return Err(TransferError::HandshakeFailed(format!("{}: {}", peer, e)));
                }
            }
        }
        if buf.is_empty() {
            let _ = stream.shutdown(Shutdown::Both);
            return Err(TransferError::HandshakeFailed(format!(
                "{} closed before sending a greeting",
                peer
            )));
        }
        let greeting = String::from_utf8_lossy(&buf).trim().to_string();
        Ok(Self {
            stream: Some(stream),
            peer,
            greeting,
        })
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Send the length line, the name and the packed header. No reply is read.
    pub fn send_file(&mut self, name: &str, header: &FileHeader) -> Result<usize> {
        let frame = Frame::new(name, *header)?;
        let stream = self.stream.as_mut().ok_or_else(|| {
            TransferError::Io(std::io::Error::new(
                ErrorKind::NotConnected,
                "connection already closed",
            ))
        })?;
        frame.write_to(stream)
    }

    /// Release the socket. Calling this again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            match stream.shutdown(Shutdown::Both) {
                Ok(()) => {}
                // Peer already went away; the socket is released either way.
                Err(e) if e.kind() == ErrorKind::NotConnected => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn dial(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| TransferError::from_dial(addr, e))?
        .collect();
    let mut last_err = None;
    for sa in addrs {
        // Zero means no connect timeout, same as the read/write timeout
        let attempt = if timeout.is_zero() {
            TcpStream::connect(sa)
        } else {
            TcpStream::connect_timeout(&sa, timeout)
        };
        match attempt {
            Ok(s) => return Ok(s),
            Err(e) => last_err = Some(e),
        }
    }
    let e = last_err.unwrap_or_else(|| {
        std::io::Error::new(ErrorKind::NotFound, "address resolved to nothing")
    });
    Err(TransferError::from_dial(addr, e))
}

// Small frames: disable Nagle, bound every read and write
fn tune_socket(stream: &TcpStream, io_timeout: Duration) -> Result<()> {
    let _ = stream.set_nodelay(true);
    let t = if io_timeout.is_zero() {
        None
    } else {
        Some(io_timeout)
    };
    stream.set_read_timeout(t)?;
    stream.set_write_timeout(t)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::RemoteAddr;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    fn config_for(listener: &TcpListener) -> TransferConfig {
        let port = listener.local_addr().unwrap().port();
        let mut cfg = TransferConfig::new(RemoteAddr::new("127.0.0.1", port));
        cfg.io_timeout = Duration::from_secs(5);
        cfg
    }

    #[test]
    fn test_connect_reads_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let cfg = config_for(&listener);
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"You have been connected!\n").unwrap();
            let mut rest = Vec::new();
            let _ = s.read_to_end(&mut rest);
        });
        let mut conn = Connection::connect(&cfg).unwrap();
        assert_eq!(conn.greeting(), "You have been connected!");
        conn.close().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_zero_connect_timeout_blocks_until_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut cfg = config_for(&listener);
        cfg.connect_timeout = Duration::ZERO;
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"hello\n").unwrap();
        });
        let mut conn = Connection::connect(&cfg).unwrap();
        assert_eq!(conn.greeting(), "hello");
        conn.close().unwrap();
        server.join().unwrap();
    }

    #[test]
    fn test_split_greeting_is_drained() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let cfg = config_for(&listener);
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"You have been ").unwrap();
            s.flush().unwrap();
            thread::sleep(Duration::from_millis(50));
            s.write_all(b"connected!\n").unwrap();
            let mut rest = Vec::new();
            s.read_to_end(&mut rest).unwrap();
            rest
        });
        let mut conn = Connection::connect(&cfg).unwrap();
        assert_eq!(conn.greeting(), "You have been connected!");
        conn.send_file("a.bin", &FileHeader::default()).unwrap();
        conn.close().unwrap();
        drop(conn);
        let rest = server.join().unwrap();
        assert_eq!(rest.len(), 2 + 5 + 27);
    }

    #[test]
    fn test_close_twice_is_noop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let cfg = config_for(&listener);
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"hi").unwrap();
        });
        let mut conn = Connection::connect(&cfg).unwrap();
        server.join().unwrap();
        assert!(conn.is_open());
        conn.close().unwrap();
        assert!(!conn.is_open());
        conn.close().unwrap();
    }

    #[test]
    fn test_send_after_close_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let cfg = config_for(&listener);
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            s.write_all(b"hi").unwrap();
        });
        let mut conn = Connection::connect(&cfg).unwrap();
        server.join().unwrap();
        conn.close().unwrap();
        let err = conn.send_file("a.bin", &FileHeader::default()).unwrap_err();
        assert_eq!(err.kind(), "Io");
    }

    #[test]
    fn test_refused_is_classified() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let cfg = TransferConfig::new(RemoteAddr::new("127.0.0.1", port));
        let err = Connection::connect(&cfg).unwrap_err();
        assert_eq!(err.kind(), "ConnectionRefused");
    }
}

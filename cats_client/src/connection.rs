//! Two-channel TCP connection to the robot controller.
//!
//! The controller listens on two ports: the operate channel accepts
//! side-effecting commands, the monitor channel answers status queries.
//! Each channel is guarded by its own mutex so a poll never waits behind an
//! operator command, while requests on one channel are strictly serialized.
//!
//! # Wire Protocol
//!
//! ```text
//! client → controller   name(a0,a1,...)\r
//! controller → client   name(v0,v1,...)\r
//! ```
//!
//! The reply must start with the command name. `message` is the only query
//! whose reply is free text.

use cats_common::robot::config::FramingMode;
use cats_common::robot::consts::{COMMAND_TERMINATOR, MAX_FRAME_LEN};
use cats_common::robot::error::ClientError;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Pause after closing the sockets so the controller releases its side.
const DISCONNECT_SETTLE: Duration = Duration::from_millis(50);

/// Chunk size of delimited reads.
const READ_CHUNK: usize = 512;

/// Which controller port a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Operate,
    Monitor,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operate => f.write_str("operate"),
            Self::Monitor => f.write_str("monitor"),
        }
    }
}

/// One open channel and the bytes read past its last reply.
#[derive(Debug)]
struct Link {
    stream: TcpStream,
    pending: Vec<u8>,
}

impl Link {
    fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Endpoint {
    host: String,
    operate_port: u16,
    monitor_port: u16,
}

/// Connection state shared by every caller of a client.
#[derive(Debug)]
pub struct Connection {
    endpoint: Mutex<Option<Endpoint>>,
    operate: Mutex<Option<Link>>,
    monitor: Mutex<Option<Link>>,
    connected: AtomicBool,
    last_connected: Mutex<Option<Instant>>,
    /// Start of the current outage, the reconnect timeout counts from here.
    down_since: Mutex<Option<Instant>>,
    last_command: Mutex<String>,
    last_error: Mutex<Option<String>>,
    read_timeout: Duration,
    framing: FramingMode,
}

impl Connection {
    pub fn new(read_timeout: Duration, framing: FramingMode) -> Self {
        Self {
            endpoint: Mutex::new(None),
            operate: Mutex::new(None),
            monitor: Mutex::new(None),
            connected: AtomicBool::new(false),
            last_connected: Mutex::new(None),
            down_since: Mutex::new(None),
            last_command: Mutex::new(String::new()),
            last_error: Mutex::new(None),
            read_timeout,
            framing,
        }
    }

    /// Open both channels.
    ///
    /// Any previous sockets are dropped first. On failure nothing stays
    /// open and the connection is left down.
    pub fn connect(&self, host: &str, operate_port: u16, monitor_port: u16) -> Result<(), ClientError> {
        *self.endpoint.lock() = Some(Endpoint {
            host: host.to_string(),
            operate_port,
            monitor_port,
        });
        self.close_streams();

        let opened = open_stream(host, operate_port, self.read_timeout).and_then(|operate| {
            open_stream(host, monitor_port, self.read_timeout).map(|monitor| (operate, monitor))
        });

        match opened {
            Ok((operate, monitor)) => {
                *self.operate.lock() = Some(Link::new(operate));
                *self.monitor.lock() = Some(Link::new(monitor));
                *self.last_connected.lock() = Some(Instant::now());
                *self.down_since.lock() = None;
                *self.last_error.lock() = None;
                self.connected.store(true, Ordering::Release);
                info!(
                    "Connected to {} (operate port {}, monitor port {})",
                    host, operate_port, monitor_port
                );
                Ok(())
            }
            Err(e) => {
                self.mark_down();
                Err(ClientError::Connection(format!(
                    "cannot connect to {host} ({operate_port}/{monitor_port}): {e}"
                )))
            }
        }
    }

    /// Close both channels. Safe to call at any time.
    pub fn disconnect(&self) {
        let was_open = self.close_streams();
        self.connected.store(false, Ordering::Release);
        if was_open {
            info!("Disconnected from controller");
            thread::sleep(DISCONNECT_SETTLE);
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// One reconnection attempt, meant to be called from a poll loop.
    ///
    /// Returns `Ok(true)` when the connection is up, `Ok(false)` after a
    /// failed attempt (the error is recorded and the call sleeps for
    /// `retry_interval`).
    ///
    /// # Errors
    ///
    /// - `NotConnected` if `connect` was never called
    /// - `ReconnectTimeout` once the outage lasts longer than `timeout`
    pub fn reconnect(&self, retry_interval: Duration, timeout: Duration) -> Result<bool, ClientError> {
        if self.is_connected() {
            return Ok(true);
        }

        let endpoint = self.endpoint.lock().clone().ok_or(ClientError::NotConnected)?;

        let now = Instant::now();
        let since = *self.down_since.lock().get_or_insert(now);
        let elapsed = now.duration_since(since);
        if elapsed > timeout {
            return Err(ClientError::ReconnectTimeout {
                elapsed_secs: elapsed.as_secs(),
            });
        }

        match self.connect(&endpoint.host, endpoint.operate_port, endpoint.monitor_port) {
            Ok(()) => {
                info!("Reconnected to {} after {:?}", endpoint.host, elapsed);
                Ok(true)
            }
            Err(e) => {
                warn!("Reconnection to {} failed: {}", endpoint.host, e);
                *self.last_error.lock() = Some(e.to_string());
                thread::sleep(retry_interval);
                Ok(false)
            }
        }
    }

    /// Send a command on the operate channel.
    pub fn operate(&self, command: &str) -> Result<String, ClientError> {
        let reply = self.request(Channel::Operate, command)?;
        *self.last_command.lock() = command.to_string();
        Ok(reply)
    }

    /// Send a query on the monitor channel.
    pub fn monitor(&self, query: &str) -> Result<String, ClientError> {
        self.request(Channel::Monitor, query)
    }

    /// Send `command` and return the reply with carriage returns removed.
    pub fn request(&self, channel: Channel, command: &str) -> Result<String, ClientError> {
        let slot = match channel {
            Channel::Operate => &self.operate,
            Channel::Monitor => &self.monitor,
        };
        let mut guard = slot.lock();
        let Some(link) = guard.as_mut() else {
            return Err(ClientError::NotConnected);
        };

        match exchange(link, command, self.framing) {
            Ok(raw) => {
                let reply = raw.replace(COMMAND_TERMINATOR, "");
                match channel {
                    Channel::Operate => debug!("{} <- {:?}", command, reply),
                    Channel::Monitor => trace!("{} <- {:?}", command, reply),
                }
                verify_echo(command, &reply)?;
                Ok(reply)
            }
            Err(e) => {
                *guard = None;
                drop(guard);
                self.mark_down();
                Err(ClientError::Connection(format!(
                    "{channel} channel failed on '{command}': {e}"
                )))
            }
        }
    }

    /// Flag the connection as lost without touching the sockets.
    pub fn mark_down(&self) {
        self.connected.store(false, Ordering::Release);
        self.down_since.lock().get_or_insert_with(Instant::now);
    }

    /// Last command accepted on the operate channel.
    pub fn last_command(&self) -> String {
        self.last_command.lock().clone()
    }

    /// Error of the last failed reconnection attempt.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn last_connected(&self) -> Option<Instant> {
        *self.last_connected.lock()
    }

    /// Drop both sockets, returning whether any was open.
    fn close_streams(&self) -> bool {
        let mut was_open = false;
        for slot in [&self.operate, &self.monitor] {
            if let Some(link) = slot.lock().take() {
                let _ = link.stream.shutdown(Shutdown::Both);
                was_open = true;
            }
        }
        was_open
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close_streams();
    }
}

fn open_stream(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, format!("{host} did not resolve"))
    }))
}

fn exchange(link: &mut Link, command: &str, framing: FramingMode) -> io::Result<String> {
    let mut frame = String::with_capacity(command.len() + 1);
    frame.push_str(command);
    frame.push(COMMAND_TERMINATOR);
    link.stream.write_all(frame.as_bytes())?;
    read_one_frame(&mut link.stream, &mut link.pending, framing)
}

/// Read one reply frame.
///
/// `SingleRead` trusts one bounded read to hold the whole reply, which is
/// what the controller firmware assumes too. `Delimited` keeps reading
/// until the terminator shows up; bytes after it stay in `pending` and
/// start the next frame. A zero-length read means the peer closed.
pub(crate) fn read_one_frame<R: Read>(
    reader: &mut R,
    pending: &mut Vec<u8>,
    framing: FramingMode,
) -> io::Result<String> {
    let closed = || io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by controller");

    match framing {
        FramingMode::SingleRead => {
            let mut buf = vec![0u8; MAX_FRAME_LEN];
            let n = reader.read(&mut buf)?;
            if n == 0 {
                return Err(closed());
            }
            Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
        }
        FramingMode::Delimited => {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                if let Some(end) = pending.iter().position(|b| *b == COMMAND_TERMINATOR as u8) {
                    let frame: Vec<u8> = pending.drain(..=end).collect();
                    return Ok(String::from_utf8_lossy(&frame[..end]).into_owned());
                }
                if pending.len() >= MAX_FRAME_LEN {
                    pending.clear();
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("reply exceeds {MAX_FRAME_LEN} bytes without terminator"),
                    ));
                }
                let n = reader.read(&mut chunk)?;
                if n == 0 {
                    return Err(closed());
                }
                pending.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

/// The reply must start with the command name, except for `message`.
pub(crate) fn verify_echo(sent: &str, received: &str) -> Result<(), ClientError> {
    let name = sent.split_once('(').map_or(sent, |(name, _)| name);
    if name == "message" || received.starts_with(name) {
        return Ok(());
    }
    Err(ClientError::Protocol {
        sent: sent.to_string(),
        received: received.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Cursor};
    use std::net::TcpListener;

    /// Controller stand-in answering each request with `reply(request)`.
    fn spawn_echo_server<F>(reply: F) -> (u16, thread::JoinHandle<()>)
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else { return };
            let mut writer = stream.try_clone().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = Vec::new();
            while reader.read_until(b'\r', &mut request).unwrap_or(0) > 0 {
                let text = String::from_utf8_lossy(&request).trim_end_matches('\r').to_string();
                let _ = writer.write_all(format!("{}\r", reply(&text)).as_bytes());
                request.clear();
            }
        });
        (port, handle)
    }

    /// Hands out its bytes in fixed-size pieces, like a fragmenting link.
    struct Chunked {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn single_read_returns_what_arrived() {
        let mut cursor = Cursor::new(b"state(1,0)\r".to_vec());
        let mut pending = Vec::new();
        assert_eq!(
            read_one_frame(&mut cursor, &mut pending, FramingMode::SingleRead).unwrap(),
            "state(1,0)\r"
        );
    }

    #[test]
    fn delimited_read_stops_at_terminator() {
        let mut cursor = Cursor::new(b"di(0101)\rdo(1".to_vec());
        let mut pending = Vec::new();
        assert_eq!(
            read_one_frame(&mut cursor, &mut pending, FramingMode::Delimited).unwrap(),
            "di(0101)"
        );
        assert_eq!(pending, b"do(1");
    }

    #[test]
    fn delimited_read_keeps_bytes_past_the_terminator() {
        let mut link = Chunked {
            data: b"state(1,0)\rdi(0101)\r".to_vec(),
            pos: 0,
            step: 13,
        };
        let mut pending = Vec::new();
        assert_eq!(
            read_one_frame(&mut link, &mut pending, FramingMode::Delimited).unwrap(),
            "state(1,0)"
        );
        assert_eq!(
            read_one_frame(&mut link, &mut pending, FramingMode::Delimited).unwrap(),
            "di(0101)"
        );
        assert!(pending.is_empty());
    }

    #[test]
    fn delimited_read_joins_fragments() {
        let mut link = Chunked {
            data: b"position(1.5,2.25,3)\r".to_vec(),
            pos: 0,
            step: 3,
        };
        let mut pending = Vec::new();
        assert_eq!(
            read_one_frame(&mut link, &mut pending, FramingMode::Delimited).unwrap(),
            "position(1.5,2.25,3)"
        );
    }

    #[test]
    fn zero_length_read_is_an_error() {
        let mut pending = Vec::new();
        let mut cursor = Cursor::new(Vec::new());
        let err = read_one_frame(&mut cursor, &mut pending, FramingMode::SingleRead).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        let mut cursor = Cursor::new(b"partial".to_vec());
        assert!(read_one_frame(&mut cursor, &mut pending, FramingMode::Delimited).is_err());
    }

    #[test]
    fn echo_check() {
        assert!(verify_echo("home(2,0)", "home(2,0)").is_ok());
        assert!(verify_echo("state", "state(1,1,1)").is_ok());
        assert!(verify_echo("message", "robot ready").is_ok());
        match verify_echo("home(2)", "put(2)") {
            Err(ClientError::Protocol { sent, received }) => {
                assert_eq!(sent, "home(2)");
                assert_eq!(received, "put(2)");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn request_without_connection_is_rejected() {
        let conn = Connection::new(Duration::from_millis(200), FramingMode::SingleRead);
        assert!(matches!(conn.monitor("state"), Err(ClientError::NotConnected)));
        assert!(matches!(
            conn.reconnect(Duration::ZERO, Duration::from_secs(1)),
            Err(ClientError::NotConnected)
        ));
    }

    #[test]
    fn operate_records_last_command() {
        let (operate, _h1) = spawn_echo_server(|req| req.to_string());
        let (monitor, _h2) = spawn_echo_server(|req| format!("{req}(1)"));
        let conn = Connection::new(Duration::from_secs(2), FramingMode::Delimited);
        conn.connect("127.0.0.1", operate, monitor).unwrap();
        assert!(conn.is_connected());

        assert_eq!(conn.operate("abort").unwrap(), "abort");
        assert_eq!(conn.last_command(), "abort");
        assert_eq!(conn.monitor("state").unwrap(), "state(1)");
        // monitor queries do not count as commands
        assert_eq!(conn.last_command(), "abort");

        conn.disconnect();
        assert!(!conn.is_connected());
        conn.disconnect();
    }

    #[test]
    fn failed_connect_leaves_connection_down() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let conn = Connection::new(Duration::from_millis(200), FramingMode::SingleRead);
        assert!(matches!(
            conn.connect("127.0.0.1", port, port),
            Err(ClientError::Connection(_))
        ));
        assert!(!conn.is_connected());
    }

    #[test]
    fn reconnect_gives_up_after_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let conn = Connection::new(Duration::from_millis(100), FramingMode::SingleRead);
        let _ = conn.connect("127.0.0.1", port, port);

        assert!(!conn.reconnect(Duration::from_millis(30), Duration::from_millis(20)).unwrap());
        assert!(conn.last_error().is_some());
        assert!(matches!(
            conn.reconnect(Duration::ZERO, Duration::from_millis(20)),
            Err(ClientError::ReconnectTimeout { .. })
        ));
    }
}

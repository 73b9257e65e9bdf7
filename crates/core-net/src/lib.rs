//! The Datagram Receiver (§4.1): binds a UDP socket, decodes one line per
//! datagram, parses it, and enqueues the result. Runs on its own thread so
//! the Render Tick never blocks on the network (§5).

use anyhow::{Context, Result};
use core_proto::parse;
use core_queue::Producer;
use socket2::{Domain, Socket, Type};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, trace, warn};

const MAX_DATAGRAM_SIZE: usize = 16 * 1024;
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Bind and configure the receive socket: blocking with a read timeout (so
/// the receiver thread can poll the shutdown flag between reads) and, on a
/// best-effort basis, a raised OS receive buffer to reduce kernel drops
/// under burst (§4.1).
fn bind_socket(bind_addr: SocketAddr, recv_buffer: usize) -> Result<UdpSocket> {
    let domain = if bind_addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::DGRAM, None)
        .with_context(|| format!("creating UDP socket for {bind_addr}"))?;
    socket
        .bind(&bind_addr.into())
        .with_context(|| format!("binding UDP socket to {bind_addr}"))?;
    if let Err(err) = socket.set_recv_buffer_size(recv_buffer) {
        warn!(target: "net", %err, requested = recv_buffer, "failed to raise OS receive buffer; continuing with default");
    }
    socket
        .set_read_timeout(Some(RECV_TIMEOUT))
        .context("setting receive timeout")?;
    Ok(socket.into())
}

/// Handle to a running receiver thread. Dropping this without calling
/// [`Receiver::shutdown`] leaves the thread running until the process exits
/// (it will still notice a closed producer channel on its next send).
pub struct Receiver {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Bind and spawn the receiver thread. The only error path that
    /// propagates is a failed bind — everything after that point is
    /// handled internally per the error taxonomy (§7).
    pub fn spawn(bind_addr: SocketAddr, recv_buffer: usize, producer: Producer) -> Result<Self> {
        let socket = bind_socket(bind_addr, recv_buffer)?;
        let local_addr = socket.local_addr().context("reading bound local address")?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();
        let handle = std::thread::Builder::new()
            .name("kiosk-net-receiver".into())
            .spawn(move || run(socket, producer, thread_shutdown))
            .context("spawning receiver thread")?;
        Ok(Self { local_addr, shutdown, handle: Some(handle) })
    }

    /// The address actually bound, useful when `bind_addr` used an
    /// OS-assigned port (`:0`) — as tests do.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the receiver to stop and wait for it to exit. At most
    /// `RECV_TIMEOUT` beyond the last in-flight read.
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(socket: UdpSocket, producer: Producer, shutdown: Arc<AtomicBool>) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    debug!(target: "net", "receiver thread started");
    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buf) {
            Ok((len, _from)) => handle_datagram(&buf[..len], &producer),
            Err(err) if is_timeout(&err) => continue,
            Err(err) => {
                warn!(target: "net", %err, "receive socket error; receiver thread exiting");
                break;
            }
        }
    }
    debug!(target: "net", "receiver thread stopped");
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
}

fn handle_datagram(raw: &[u8], producer: &Producer) {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    let line = trimmed.strip_suffix(';').unwrap_or(trimmed);
    match parse(line) {
        Ok(command) => producer.enqueue(command),
        Err(err) => trace!(target: "net", reason = %err, "dropped unparseable datagram"),
    }
}

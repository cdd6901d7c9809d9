use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use super::{
    media_transport::{MediaTransport, ReceiveCallback},
    transport_error::TransportError,
};
use crate::{log::log_sink::LogSink, sink_debug, sink_info, sink_warn};

/// How often the receive loop checks its stop flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(50);
const MAX_DATAGRAM: usize = 1500;

struct ReceiveLoop {
    stop_flag: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// RTP and RTCP multiplexed on one UDP socket.
pub struct UdpTransport {
    sock: Arc<UdpSocket>,
    remote: SocketAddr,
    receive_loop: Mutex<Option<ReceiveLoop>>,
    logger: Arc<dyn LogSink>,
}

impl UdpTransport {
    pub fn bind(
        local: SocketAddr,
        remote: SocketAddr,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, TransportError> {
        Self::from_socket(UdpSocket::bind(local)?, remote, logger)
    }

    /// Wraps an already bound socket.
    pub fn from_socket(
        sock: UdpSocket,
        remote: SocketAddr,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, TransportError> {
        sock.set_read_timeout(Some(RECV_TIMEOUT))?;
        let local = sock.local_addr()?;
        sink_info!(logger, "[UDP] bound {local} -> {remote}");
        Ok(Self {
            sock: Arc::new(sock),
            remote,
            receive_loop: Mutex::new(None),
            logger,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.sock.local_addr()?)
    }

    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sock.send_to(bytes, self.remote)?;
        Ok(())
    }
}

impl MediaTransport for UdpTransport {
    fn send_rtp(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.send(bytes)
    }

    fn send_rtcp(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.send(bytes)
    }

    fn register_receive_callback(&self, cb: ReceiveCallback) -> Result<(), TransportError> {
        let mut slot = self
            .receive_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(TransportError::AlreadyRegistered);
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop = stop_flag.clone();
        let sock = self.sock.clone();
        let logger = self.logger.clone();
        let handle = thread::Builder::new()
            .name("udp-media-rx".into())
            .spawn(move || {
                let mut buf = [0u8; MAX_DATAGRAM];
                while !stop.load(Ordering::SeqCst) {
                    match sock.recv_from(&mut buf) {
                        Ok((n, _from)) => cb(&buf[..n]),
                        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                        Err(e) => {
                            sink_warn!(logger, "[UDP] recv failed: {e}");
                        }
                    }
                }
                sink_debug!(logger, "[UDP] receive loop stopped");
            })
            .map_err(|e| TransportError::Spawn(e.to_string()))?;

        *slot = Some(ReceiveLoop { stop_flag, handle });
        Ok(())
    }

    fn unregister_receive_callback(&self) {
        let taken = self
            .receive_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(rl) = taken else {
            return;
        };
        rl.stop_flag.store(true, Ordering::SeqCst);
        if rl.handle.thread().id() == thread::current().id() {
            // Unregistering from inside the callback; the loop exits on return.
            return;
        }
        if rl.handle.join().is_err() {
            sink_warn!(self.logger, "[UDP] receive thread panicked");
        }
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.unregister_receive_callback();
    }
}

use super::transport_error::TransportError;

/// Invoked with every datagram received, RTP and RTCP alike.
pub type ReceiveCallback = Box<dyn Fn(&[u8]) + Send + Sync>;

/// Datagram path between the two endpoints of a stream.
pub trait MediaTransport: Send + Sync {
    fn send_rtp(&self, bytes: &[u8]) -> Result<(), TransportError>;

    fn send_rtcp(&self, bytes: &[u8]) -> Result<(), TransportError>;

    fn register_receive_callback(&self, cb: ReceiveCallback) -> Result<(), TransportError>;

    /// Returns once no callback invocation is in flight.
    fn unregister_receive_callback(&self);
}

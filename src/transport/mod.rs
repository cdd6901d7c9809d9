pub mod media_transport;
pub mod transport_error;
pub mod udp_transport;

pub use media_transport::{MediaTransport, ReceiveCallback};
pub use transport_error::TransportError;
pub use udp_transport::UdpTransport;

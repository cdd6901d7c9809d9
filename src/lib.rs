//! RustyStream is a real-time RTP media stream engine.
//!
//! A [`stream::Stream`] carries one audio flow between two endpoints over an
//! unreliable datagram transport. Outbound frames are encoded, sequenced and
//! timestamped; inbound packets are validated, reordered in an adaptive
//! jitter buffer and handed to the decoder at playout time. RTCP reports and
//! RFC4733 DTMF events travel alongside the media.
//!
//! Codec, transport, timer and clock are collaborators behind traits so the
//! engine can be driven from real sockets or entirely in memory.

/// Audio codec trait and the built-in G.711 µ-law implementation.
pub mod codec;
/// Handles configuration loading and management.
pub mod config;
/// RFC4733 telephone-event sending and receiving.
pub mod dtmf;
/// Adaptive reordering buffer between the network and playout.
pub mod jitter_buffer;
/// Logging utilities.
pub mod log;
/// RTCP (RTP Control Protocol) packet parsing and building.
pub mod rtcp;
/// Reception statistics and RTCP report generation.
pub mod rtcp_session;
/// RTP (Real-time Transport Protocol) packet parsing and building.
pub mod rtp;
/// Sequence/timestamp bookkeeping and source validation.
pub mod rtp_session;
/// The stream coordinator tying every component together.
pub mod stream;
/// Periodic timer and media clock collaborators.
pub mod timer;
/// Datagram transport collaborator and its UDP implementation.
pub mod transport;

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use super::{
    rtcp_interval::next_rtcp_interval,
    stream_config::StreamConfig,
    stream_error::{Result, StreamError},
    stream_info::StreamInfo,
    stream_state::{Direction, StreamState},
    stream_stat::{DtmfStat, StreamStat},
};
use crate::{
    codec::{Codec, OpenCodecFn, open_codec},
    dtmf::{DtmfError, DtmfObserver, DtmfReceiver, DtmfSender, TelephoneEvent},
    jitter_buffer::{JbFrame, JbState, JitterBuffer},
    log::log_sink::LogSink,
    rtcp::{RtcpError, is_rtcp},
    rtcp_session::RtcpSession,
    rtp::time::NtpTime,
    rtp_session::{RtpSession, RtpSessionInfo, RxDecision},
    sink_debug, sink_info, sink_trace, sink_warn,
    timer::{MediaClock, Timer, TimerHandle},
    transport::MediaTransport,
};

/// How often the timer checks whether an RTCP report is due.
pub const RTCP_TICK: Duration = Duration::from_millis(100);

/// Everything a stream talks to but does not own.
pub struct StreamCollaborators {
    pub transport: Arc<dyn MediaTransport>,
    pub timer: Arc<dyn Timer>,
    pub clock: Arc<dyn MediaClock>,
    pub logger: Arc<dyn LogSink>,
    pub open_codec: OpenCodecFn,
}

impl StreamCollaborators {
    pub fn new(
        transport: Arc<dyn MediaTransport>,
        timer: Arc<dyn Timer>,
        clock: Arc<dyn MediaClock>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            transport,
            timer,
            clock,
            logger,
            open_codec,
        }
    }

    pub fn with_codec(mut self, open: OpenCodecFn) -> Self {
        self.open_codec = open;
        self
    }
}

struct Control {
    state: StreamState,
    paused_tx: bool,
    paused_rx: bool,
    /// The next packet sent carries the marker bit.
    marker_pending: bool,
    /// Set on transmit resume: the timestamp is realigned to the media clock
    /// before the next packet.
    realign_tx: bool,
    /// Media-clock time and media timestamp of the last frame sent.
    last_tx: Option<(Duration, u32)>,
    timer: Option<TimerHandle>,
    rtcp_due: Duration,
}

impl Control {
    fn require(&self, op: &'static str, wanted: StreamState) -> Result<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(StreamError::InvalidOperation {
                op,
                state: self.state,
            })
        }
    }

    fn require_alive(&self, op: &'static str) -> Result<()> {
        if self.state == StreamState::Destroyed {
            Err(StreamError::InvalidOperation {
                op,
                state: self.state,
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct RxCounters {
    unknown_pt: AtomicU64,
    dropped_paused: AtomicU64,
    malformed_events: AtomicU64,
}

struct StreamInner {
    info: StreamInfo,
    cfg: StreamConfig,
    frame_samples: u32,
    /// Wall-clock offset added to the media clock for NTP timestamps.
    ntp_origin: Duration,

    control: Mutex<Control>,
    rtp: Mutex<RtpSession>,
    jitter_buffer: Mutex<JitterBuffer>,
    rtcp: Mutex<RtcpSession>,
    dtmf_tx: Mutex<DtmfSender>,
    dtmf_rx: Mutex<DtmfReceiver>,
    observer: Mutex<Option<Arc<dyn DtmfObserver>>>,
    encoder: Mutex<Box<dyn Codec>>,
    decoder: Mutex<Box<dyn Codec>>,
    counters: RxCounters,

    transport: Arc<dyn MediaTransport>,
    timer: Arc<dyn Timer>,
    clock: Arc<dyn MediaClock>,
    logger: Arc<dyn LogSink>,
}

/// One bidirectional RTP media stream.
///
/// Locks are per component and never nested; none is held while calling
/// the codec, the transport or the DTMF observer.
pub struct Stream {
    inner: Arc<StreamInner>,
}

impl Stream {
    /// Builds every component. Nothing is registered with the transport or
    /// timer until [`Stream::start`].
    pub fn create(info: StreamInfo, cfg: StreamConfig, collab: StreamCollaborators) -> Result<Self> {
        info.validate().map_err(StreamError::InvalidInfo)?;
        let encoder = (collab.open_codec)(&info.codec).map_err(StreamError::CodecOpen)?;
        let decoder = (collab.open_codec)(&info.codec).map_err(StreamError::CodecOpen)?;
        let logger = collab.logger;
        let clock_rate = info.codec.clock_rate;

        let mut rtp_cfg = cfg.rtp.clone();
        if info.local_ssrc.is_some() {
            rtp_cfg.local_ssrc = info.local_ssrc;
        }
        // a jump the ring cannot hold is a restart
        rtp_cfg.max_dropout = Some(cfg.rtp.max_dropout_or(cfg.jitter_buffer.capacity));
        let rtp = RtpSession::new(&rtp_cfg, logger.clone());

        let mut rtcp_cfg = cfg.rtcp.clone();
        if let Some(cname) = &info.cname {
            rtcp_cfg.cname = cname.clone();
        }
        let rtcp = RtcpSession::new(rtp.local_ssrc(), clock_rate, &rtcp_cfg, logger.clone());
        let jitter_buffer = JitterBuffer::new(cfg.jitter_buffer.clone(), logger.clone())?;
        let dtmf_tx = DtmfSender::new(cfg.dtmf.clone(), clock_rate, logger.clone());
        let dtmf_rx = DtmfReceiver::new(clock_rate, cfg.dtmf.queue_capacity, logger.clone());

        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let ntp_origin = wall.saturating_sub(collab.clock.now());

        sink_info!(
            logger,
            "[Stream] created ssrc={:#010x} codec={} pt={} {} Hz",
            rtp.local_ssrc(),
            info.codec.name,
            info.codec.payload_type,
            clock_rate
        );

        let frame_samples = info.codec.frame_samples();
        let inner = StreamInner {
            info,
            cfg,
            frame_samples,
            ntp_origin,
            control: Mutex::new(Control {
                state: StreamState::Created,
                paused_tx: false,
                paused_rx: false,
                marker_pending: true,
                realign_tx: false,
                last_tx: None,
                timer: None,
                rtcp_due: Duration::ZERO,
            }),
            rtp: Mutex::new(rtp),
            jitter_buffer: Mutex::new(jitter_buffer),
            rtcp: Mutex::new(rtcp),
            dtmf_tx: Mutex::new(dtmf_tx),
            dtmf_rx: Mutex::new(dtmf_rx),
            observer: Mutex::new(None),
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            counters: RxCounters::default(),
            transport: collab.transport,
            timer: collab.timer,
            clock: collab.clock,
            logger,
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Hooks the stream to the transport and schedules RTCP.
    pub fn start(&self) -> Result<()> {
        let inner = &self.inner;
        inner.control.lock()?.require("start", StreamState::Created)?;

        let weak = Arc::downgrade(inner);
        inner
            .transport
            .register_receive_callback(Box::new(move |bytes| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_receive(bytes);
                }
            }))?;

        let weak = Arc::downgrade(inner);
        let tick = inner.timer.schedule_periodic(
            RTCP_TICK,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_rtcp_tick();
                }
            }),
        );
        let handle = match tick {
            Ok(h) => h,
            Err(e) => {
                inner.transport.unregister_receive_callback();
                return Err(e.into());
            }
        };

        let now = inner.clock.now();
        let mut ctl = inner.control.lock()?;
        ctl.state = StreamState::Started;
        ctl.marker_pending = true;
        ctl.timer = Some(handle);
        ctl.rtcp_due = now + inner.next_report_delay();
        sink_info!(inner.logger, "[Stream] started");
        Ok(())
    }

    /// Encodes and sends one frame, or the pending DTMF packet in its place.
    pub fn put_frame(&self, pcm: &[i16]) -> Result<()> {
        let inner = &self.inner;
        let now = inner.clock.now();
        let (marker, realign_from) = {
            let mut ctl = inner.control.lock()?;
            ctl.require("put_frame", StreamState::Started)?;
            if ctl.paused_tx || !inner.info.direction.sends() {
                return Ok(());
            }
            let realign = if std::mem::take(&mut ctl.realign_tx) {
                ctl.last_tx
            } else {
                None
            };
            (std::mem::take(&mut ctl.marker_pending), realign)
        };
        inner.send_frame(pcm, now, marker, realign_from)
    }

    /// Pulls one frame for playout into `out` and reports what the jitter
    /// buffer produced. Silence is written when nothing can be decoded.
    pub fn get_frame(&self, out: &mut Vec<i16>) -> Result<JbFrame> {
        let inner = &self.inner;
        let paused = {
            let ctl = inner.control.lock()?;
            ctl.require("get_frame", StreamState::Started)?;
            ctl.paused_rx || !inner.info.direction.receives()
        };
        if paused {
            inner.fill_silence(out);
            return Ok(JbFrame::NotReady);
        }

        let mut payload = Vec::with_capacity(inner.cfg.jitter_buffer.max_frame_size);
        let frame = inner.jitter_buffer.lock()?.get(&mut payload);
        match frame {
            JbFrame::Frame { .. } => inner.decoder.lock()?.decode(Some(&payload), out)?,
            JbFrame::Missing { .. } => inner.decoder.lock()?.decode(None, out)?,
            JbFrame::Skipped { .. } | JbFrame::NotReady | JbFrame::Empty => inner.fill_silence(out),
        }
        inner.rtcp.lock()?.on_playout(frame);
        Ok(frame)
    }

    pub fn pause(&self, dir: Direction) -> Result<()> {
        let mut ctl = self.inner.control.lock()?;
        ctl.require("pause", StreamState::Started)?;
        if dir.sends() {
            ctl.paused_tx = true;
        }
        if dir.receives() {
            ctl.paused_rx = true;
        }
        sink_debug!(self.inner.logger, "[Stream] paused {dir:?}");
        Ok(())
    }

    /// Resuming transmit realigns the RTP timestamp so the gap matches the
    /// time spent paused. Resuming receive restarts the jitter buffer.
    pub fn resume(&self, dir: Direction) -> Result<()> {
        let flush_rx = {
            let mut ctl = self.inner.control.lock()?;
            ctl.require("resume", StreamState::Started)?;
            if dir.sends() && ctl.paused_tx {
                ctl.paused_tx = false;
                ctl.realign_tx = true;
                ctl.marker_pending = true;
            }
            let flush = dir.receives() && ctl.paused_rx;
            if dir.receives() {
                ctl.paused_rx = false;
            }
            flush
        };
        if flush_rx {
            self.inner.jitter_buffer.lock()?.flush();
        }
        sink_debug!(self.inner.logger, "[Stream] resumed {dir:?}");
        Ok(())
    }

    /// Stops the RTCP timer, detaches from the transport and says BYE.
    pub fn destroy(&self) -> Result<()> {
        let inner = &self.inner;
        let (was_started, timer) = {
            let mut ctl = inner.control.lock()?;
            ctl.require_alive("destroy")?;
            let was_started = ctl.state == StreamState::Started;
            ctl.state = StreamState::Destroyed;
            (was_started, ctl.timer.take())
        };
        if let Some(handle) = timer {
            inner.timer.cancel(handle);
        }
        if was_started {
            inner.transport.unregister_receive_callback();
            if let Err(e) = inner.send_rtcp(|rtcp, now| rtcp.build_bye(now, None)) {
                sink_warn!(inner.logger, "[Stream] BYE not sent: {e}");
            }
        }
        inner.dtmf_tx.lock()?.cancel();
        sink_info!(inner.logger, "[Stream] destroyed");
        Ok(())
    }

    pub fn state(&self) -> StreamState {
        self.inner
            .control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn info(&self) -> Result<&StreamInfo> {
        self.inner.control.lock()?.require_alive("info")?;
        Ok(&self.inner.info)
    }

    /// The transport this stream sends through and listens on.
    pub fn transport(&self) -> Result<Arc<dyn MediaTransport>> {
        self.inner.control.lock()?.require_alive("transport")?;
        Ok(self.inner.transport.clone())
    }

    pub fn get_stat(&self) -> Result<StreamStat> {
        let inner = &self.inner;
        inner.control.lock()?.require_alive("get_stat")?;
        let rtcp = inner.rtcp.lock()?.stat();
        let rtp = inner.rtp.lock()?.info();
        let digits_sent = inner.dtmf_tx.lock()?.digits_sent();
        let (digits_received, digits_dropped) = {
            let rx = inner.dtmf_rx.lock()?;
            (rx.digits_received(), rx.dropped())
        };
        Ok(StreamStat {
            rtcp,
            rtp,
            dtmf: DtmfStat {
                digits_sent,
                digits_received,
                digits_dropped,
                malformed_events: inner.counters.malformed_events.load(Ordering::Relaxed),
            },
            rx_unknown_pt: inner.counters.unknown_pt.load(Ordering::Relaxed),
            rx_dropped_paused: inner.counters.dropped_paused.load(Ordering::Relaxed),
        })
    }

    pub fn get_stat_jbuf(&self) -> Result<JbState> {
        self.inner.control.lock()?.require_alive("get_stat_jbuf")?;
        Ok(self.inner.jitter_buffer.lock()?.state())
    }

    pub fn reset_stat(&self) -> Result<()> {
        let inner = &self.inner;
        inner.control.lock()?.require_alive("reset_stat")?;
        inner.rtcp.lock()?.reset_stat();
        inner.jitter_buffer.lock()?.reset_stats();
        inner.counters.unknown_pt.store(0, Ordering::Relaxed);
        inner.counters.dropped_paused.store(0, Ordering::Relaxed);
        inner.counters.malformed_events.store(0, Ordering::Relaxed);
        Ok(())
    }

    pub fn rtp_session_info(&self) -> Result<RtpSessionInfo> {
        self.inner.control.lock()?.require_alive("rtp_session_info")?;
        Ok(self.inner.rtp.lock()?.info())
    }

    /// What the last `get_frame` pulled from the jitter buffer.
    pub fn last_jb_frame(&self) -> Result<Option<JbFrame>> {
        self.inner.control.lock()?.require_alive("last_jb_frame")?;
        Ok(self.inner.jitter_buffer.lock()?.last_frame())
    }

    /// Queues `digits` for RFC4733 transmission; `duration_ms == 0` uses the
    /// configured default.
    pub fn dial_dtmf(&self, digits: &str, duration_ms: u32) -> Result<()> {
        let inner = &self.inner;
        inner.control.lock()?.require("dial_dtmf", StreamState::Started)?;
        if inner.info.tx_event_pt.is_none() {
            return Err(DtmfError::NotSupported.into());
        }
        inner.dtmf_tx.lock()?.dial(digits, duration_ms)?;
        Ok(())
    }

    /// Takes up to `max` received digits, oldest first.
    pub fn get_dtmf(&self, max: usize) -> Result<Vec<char>> {
        let inner = &self.inner;
        inner.control.lock()?.require_alive("get_dtmf")?;
        if inner.info.rx_event_pt.is_none() {
            return Err(DtmfError::NotSupported.into());
        }
        Ok(inner.dtmf_rx.lock()?.take_digits(max))
    }

    pub fn check_dtmf(&self) -> Result<bool> {
        let inner = &self.inner;
        inner.control.lock()?.require_alive("check_dtmf")?;
        if inner.info.rx_event_pt.is_none() {
            return Err(DtmfError::NotSupported.into());
        }
        Ok(inner.dtmf_rx.lock()?.has_digits())
    }

    /// With an observer set, received digits bypass the `get_dtmf` queue.
    pub fn set_dtmf_observer(&self, observer: Option<Arc<dyn DtmfObserver>>) -> Result<()> {
        let inner = &self.inner;
        inner.control.lock()?.require_alive("set_dtmf_observer")?;
        let attached = observer.is_some();
        *inner.observer.lock()? = observer;
        inner.dtmf_rx.lock()?.set_observer_attached(attached);
        Ok(())
    }

    pub fn send_rtcp_sdes(&self) -> Result<()> {
        self.inner.control.lock()?.require("send_rtcp_sdes", StreamState::Started)?;
        self.inner.send_rtcp(|rtcp, now| rtcp.build_sdes(now))
    }

    /// Sends BYE without tearing the stream down.
    pub fn send_rtcp_bye(&self, reason: Option<&str>) -> Result<()> {
        self.inner.control.lock()?.require("send_rtcp_bye", StreamState::Started)?;
        self.inner.send_rtcp(|rtcp, now| rtcp.build_bye(now, reason))
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        if self.state() != StreamState::Destroyed {
            let _ = self.destroy();
        }
    }
}

impl StreamInner {
    fn samples(&self, d: Duration) -> u32 {
        (d.as_nanos() * u128::from(self.info.codec.clock_rate) / 1_000_000_000) as u32
    }

    fn ntp_now(&self) -> NtpTime {
        NtpTime::from_unix(self.ntp_origin + self.clock.now())
    }

    fn next_report_delay(&self) -> Duration {
        next_rtcp_interval(
            self.cfg.rtcp.interval,
            self.cfg.rtcp.min_interval,
            &mut rand::thread_rng(),
        )
    }

    fn fill_silence(&self, out: &mut Vec<i16>) {
        out.clear();
        out.resize(self.frame_samples as usize, 0);
    }

    fn send_frame(
        &self,
        pcm: &[i16],
        now: Duration,
        marker: bool,
        realign_from: Option<(Duration, u32)>,
    ) -> Result<()> {
        let ts_len = self.frame_samples;
        let media_ts = {
            let mut rtp = self.rtp.lock()?;
            if let Some((sent_at, sent_ts)) = realign_from {
                let target = sent_ts.wrapping_add(self.samples(now.saturating_sub(sent_at)));
                let ahead = target.wrapping_sub(rtp.tx().next_timestamp()) as i32;
                if ahead > 0 {
                    rtp.advance_timestamp(ahead as u32);
                    sink_debug!(self.logger, "[Stream] tx resumed, timestamp advanced by {ahead}");
                }
            }
            rtp.tx().next_timestamp()
        };

        let event = match self.info.tx_event_pt {
            Some(pt) => self.dtmf_tx.lock()?.poll(media_ts, ts_len).map(|ev| (pt, ev)),
            None => None,
        };
        let (bytes, payload_len, header_ts) = match event {
            Some((pt, ev)) => {
                let bytes = self.rtp.lock()?.encode_with_timestamp(
                    &ev.payload,
                    ev.marker || marker,
                    pt,
                    ev.timestamp,
                    ts_len,
                )?;
                (bytes, ev.payload.len(), ev.timestamp)
            }
            None => {
                let mut payload = Vec::with_capacity(pcm.len());
                self.encoder.lock()?.encode(pcm, &mut payload)?;
                let bytes = self.rtp.lock()?.encode_header(
                    &payload,
                    marker,
                    self.info.codec.payload_type,
                    ts_len,
                )?;
                (bytes, payload.len(), media_ts)
            }
        };

        // The timestamp is consumed whether or not the send succeeds.
        self.control.lock()?.last_tx = Some((now, media_ts));
        self.transport.send_rtp(&bytes)?;
        self.rtp.lock()?.on_sent(payload_len, header_ts);
        self.rtcp.lock()?.on_tx_rtp(payload_len, media_ts);
        sink_trace!(self.logger, "[Stream] sent {} bytes ts={header_ts}", bytes.len());
        Ok(())
    }

    fn send_rtcp<F>(&self, build: F) -> Result<()>
    where
        F: FnOnce(&mut RtcpSession, NtpTime) -> std::result::Result<Vec<u8>, RtcpError>,
    {
        let now = self.ntp_now();
        let bytes = {
            let mut rtcp = self.rtcp.lock()?;
            build(&mut *rtcp, now)?
        };
        self.transport.send_rtcp(&bytes)?;
        sink_trace!(self.logger, "[Stream] sent RTCP compound ({} bytes)", bytes.len());
        Ok(())
    }

    fn on_rtcp_tick(&self) {
        let now = self.clock.now();
        {
            let Ok(mut ctl) = self.control.lock() else {
                return;
            };
            if ctl.state != StreamState::Started || now < ctl.rtcp_due {
                return;
            }
            ctl.rtcp_due = now + self.next_report_delay();
        }
        if let Err(e) = self.send_rtcp(|rtcp, ntp| rtcp.build_report(ntp)) {
            sink_warn!(self.logger, "[Stream] RTCP report failed: {e}");
        }
    }

    fn on_receive(&self, bytes: &[u8]) {
        let paused_rx = match self.control.lock() {
            Ok(ctl) if ctl.state == StreamState::Started => ctl.paused_rx,
            _ => return,
        };
        if is_rtcp(bytes) {
            let now = self.ntp_now();
            if let Ok(mut rtcp) = self.rtcp.lock() {
                if let Err(e) = rtcp.on_rx_rtcp(bytes, now) {
                    sink_debug!(self.logger, "[Stream] dropping RTCP: {e}");
                }
            }
            return;
        }
        if let Err(e) = self.on_rtp(bytes, paused_rx) {
            sink_warn!(self.logger, "[Stream] receive path failed: {e}");
        }
    }

    fn on_rtp(&self, bytes: &[u8], paused_rx: bool) -> Result<()> {
        // Malformed packets are counted and logged by the session.
        let rx = self.rtp.lock()?.on_rx(bytes);
        let Ok((pkt, decision)) = rx else {
            return Ok(());
        };
        let (ext_seq, validated) = match decision {
            RxDecision::Duplicate | RxDecision::Discard => return Ok(()),
            RxDecision::Accept { ext_seq, validated } => (ext_seq, validated),
            RxDecision::Resync { ext_seq, validated } => {
                self.jitter_buffer.lock()?.flush();
                self.rtcp.lock()?.restart_rx();
                self.dtmf_rx.lock()?.reset();
                (ext_seq, validated)
            }
        };

        let h = &pkt.header;
        if validated {
            let arrival = self.samples(self.clock.now());
            self.rtcp
                .lock()?
                .on_rx_rtp(h.ssrc, ext_seq, h.timestamp, arrival, pkt.payload.len());
        }
        if paused_rx || !self.info.direction.receives() {
            self.counters.dropped_paused.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        if Some(h.payload_type) == self.info.rx_event_pt {
            // keeps the event's sequence from playing out as a lost frame
            self.jitter_buffer.lock()?.skip(h.sequence_number, h.timestamp);
            self.on_telephone_event(&pkt.payload, h.timestamp)
        } else if h.payload_type == self.info.codec.payload_type {
            let outcome = self
                .jitter_buffer
                .lock()?
                .put(h.sequence_number, h.timestamp, &pkt.payload);
            sink_trace!(self.logger, "[Stream] jb put seq={} -> {outcome:?}", h.sequence_number);
            self.dtmf_rx.lock()?.on_audio(h.timestamp);
            Ok(())
        } else {
            self.counters.unknown_pt.fetch_add(1, Ordering::Relaxed);
            sink_trace!(self.logger, "[Stream] ignoring payload type {}", h.payload_type);
            Ok(())
        }
    }

    fn on_telephone_event(&self, payload: &[u8], timestamp: u32) -> Result<()> {
        let ev = match TelephoneEvent::decode(payload) {
            Ok(ev) => ev,
            Err(e) => {
                self.counters.malformed_events.fetch_add(1, Ordering::Relaxed);
                sink_debug!(self.logger, "[Stream] bad telephone-event payload: {e}");
                return Ok(());
            }
        };
        let notifications = self.dtmf_rx.lock()?.on_event(&ev, timestamp);
        if notifications.is_empty() {
            return Ok(());
        }
        let observer = self.observer.lock()?.clone();
        if let Some(observer) = observer {
            for n in &notifications {
                observer.on_event(n);
            }
        }
        Ok(())
    }
}

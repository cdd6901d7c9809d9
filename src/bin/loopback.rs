use std::{
    env,
    net::{SocketAddr, UdpSocket},
    process,
    sync::Arc,
    thread,
    time::Duration,
};

use rustystream::{
    config::Config,
    log::{LogSink, TracingLogSink},
    rtp_session::RtpCodec,
    stream::{Stream, StreamCollaborators, StreamConfig, StreamError, StreamInfo},
    timer::{SystemClock, ThreadTimer},
    transport::{TransportError, UdpTransport},
};

const EVENT_PT: u8 = 101;
const CALL_SECONDS: u64 = 3;

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    //   cargo run --bin loopback
    //      -> default settings, dials "123#"
    //
    //   cargo run --bin loopback -- stream.ini
    //   cargo run --bin loopback -- stream.ini 5551234
    let args: Vec<String> = env::args().collect();
    let (config, digits) = match args.len() {
        1 => (Config::empty(), "123#".to_owned()),
        2 => (load_or_exit(&args[1]), "123#".to_owned()),
        3 => (load_or_exit(&args[1]), args[2].clone()),
        _ => {
            eprintln!("Usage:");
            eprintln!("  {} [CONFIG.ini] [DIGITS]", args[0]);
            process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_target(false).init();

    if let Err(e) = run(&config, &digits) {
        eprintln!("[loopback] {e}");
        process::exit(1);
    }
}

fn load_or_exit(path: &str) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        eprintln!("[loopback] {e}");
        process::exit(1);
    })
}

/// Two streams on localhost: `alice` talks and dials, `bob` listens.
fn run(config: &Config, digits: &str) -> Result<(), StreamError> {
    let cfg = StreamConfig::from_config(config)?;
    let logger: Arc<dyn LogSink> = Arc::new(TracingLogSink);
    let clock = Arc::new(SystemClock::new());
    let timer = Arc::new(ThreadTimer::new(logger.clone()));

    let localhost = SocketAddr::from(([127, 0, 0, 1], 0));
    let alice_sock = UdpSocket::bind(localhost).map_err(TransportError::from)?;
    let bob_sock = UdpSocket::bind(localhost).map_err(TransportError::from)?;
    let alice_addr = alice_sock.local_addr().map_err(TransportError::from)?;
    let bob_addr = bob_sock.local_addr().map_err(TransportError::from)?;
    let alice_sock = UdpTransport::from_socket(alice_sock, bob_addr, logger.clone())?;
    let bob_sock = UdpTransport::from_socket(bob_sock, alice_addr, logger.clone())?;

    let info = StreamInfo::new(RtpCodec::pcmu()).with_telephone_event(EVENT_PT);
    let alice = Stream::create(
        info.clone(),
        cfg.clone(),
        StreamCollaborators::new(Arc::new(alice_sock), timer.clone(), clock.clone(), logger.clone()),
    )?;
    let bob = Stream::create(
        info,
        cfg,
        StreamCollaborators::new(Arc::new(bob_sock), timer, clock, logger),
    )?;
    alice.start()?;
    bob.start()?;

    let frame = RtpCodec::pcmu().frame_samples() as usize;
    let ptime = Duration::from_millis(u64::from(RtpCodec::pcmu().ptime_ms));
    let mut pcm_out = Vec::with_capacity(frame);
    let mut phase = 0f32;
    let step = 2.0 * std::f32::consts::PI * 440.0 / 8000.0;

    let frames = CALL_SECONDS * 1000 / ptime.as_millis() as u64;
    for n in 0..frames {
        if n == 25 {
            alice.dial_dtmf(digits, 0)?;
        }
        let tone: Vec<i16> = (0..frame)
            .map(|_| {
                phase += step;
                (phase.sin() * 8000.0) as i16
            })
            .collect();
        alice.put_frame(&tone)?;
        bob.get_frame(&mut pcm_out)?;
        thread::sleep(ptime);
    }
    // let the tail of the last digit arrive
    thread::sleep(Duration::from_millis(200));

    let received: String = bob.get_dtmf(64)?.into_iter().collect();
    let stat = bob.get_stat()?;
    let jb = bob.get_stat_jbuf()?;
    println!("digits dialed:   {digits}");
    println!("digits received: {received}");
    println!(
        "rx packets={} lost={} jitter={:.2} ms played={} concealed={}",
        stat.rtcp.rx.packets,
        stat.rtcp.rx.cumulative_lost,
        stat.rtcp.rx.jitter_ms,
        stat.rtcp.rx.frames_played,
        stat.rtcp.rx.frames_concealed
    );
    println!("jitter buffer prefetch={} phase={:?}", jb.target_prefetch, jb.phase);

    alice.destroy()?;
    bob.destroy()?;
    Ok(())
}

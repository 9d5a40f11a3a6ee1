use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tokio::task::LocalSet;

use piano_led_bridge::demo::{ScriptedTransport, Sequence};
use piano_led_bridge::led::FrameBufferStrip;
use piano_led_bridge::midi::UdpTransport;
use piano_led_bridge::{
    handoff, run_collector, run_renderer, BridgeConfig, LedTransport, MidiTransport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// A USB MIDI keyboard (needs the `midi-input` feature)
    Midi,
    /// "note velocity;" datagrams on `udp_bind`
    Udp,
    /// A built-in sequence
    Demo,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Light up an LED strip from MIDI notes")]
struct Args {
    /// JSON config file; missing means defaults
    #[arg(short, long, default_value = "bridge_config.json")]
    config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Source::Midi)]
    source: Source,

    /// Sequence played by `--source demo`
    #[arg(long, value_enum, default_value_t = Sequence::Flourish)]
    demo: Sequence,

    /// Render into memory instead of the ws281x strip
    #[arg(long)]
    dry_run: bool,
}

async fn open_source(args: &Args, config: &BridgeConfig) -> Result<Box<dyn MidiTransport>> {
    let midi: Box<dyn MidiTransport> = match args.source {
        Source::Demo => {
            log::info!("Playing demo sequence {:?}", args.demo);
            Box::new(ScriptedTransport::new(&args.demo.steps()))
        }
        Source::Udp => {
            let addr = config
                .udp_bind
                .context("--source udp needs `udp_bind` in the config")?;
            Box::new(UdpTransport::bind(addr).await?)
        }
        #[cfg(feature = "midi-input")]
        Source::Midi => Box::new(piano_led_bridge::midi::MidirTransport::connect(
            &config.midi_port,
            config.midi_buffer,
        )?),
        #[cfg(not(feature = "midi-input"))]
        Source::Midi => bail!("built without the `midi-input` feature; try --source udp or demo"),
    };
    Ok(midi)
}

fn open_strip(args: &Args, config: &BridgeConfig) -> Result<Box<dyn LedTransport>> {
    #[cfg(feature = "ws281x")]
    if !args.dry_run {
        return Ok(Box::new(piano_led_bridge::led::Ws281xStrip::new(
            config.led_pin,
            config.strip_length,
            config.led_brightness,
        )?));
    }
    if !args.dry_run {
        log::warn!("Built without the `ws281x` feature, rendering into memory");
    }
    Ok(Box::new(FrameBufferStrip::new(config.strip_length)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = BridgeConfig::load(&args.config)?;
    log::info!("Starting with {:?}", config);

    let midi = open_source(&args, &config).await?;
    let strip = open_strip(&args, &config)?;
    let (tx, rx) = handoff(
        config.channel_capacity,
        config.backpressure,
        config.send_timeout(),
    );

    // Single-threaded like the board: neither transport has to be Send.
    let local = LocalSet::new();
    let collector = local.spawn_local(run_collector(midi, tx, config.idle_poll_delay()));
    let renderer = local.spawn_local(run_renderer(rx, strip, config.note_range()));

    local
        .run_until(async move {
            collector.await.context("collector task failed")?;
            renderer.await.context("renderer task failed")?;
            Ok::<_, anyhow::Error>(())
        })
        .await?;

    if args.source != Source::Demo {
        bail!("MIDI source closed");
    }
    Ok(())
}

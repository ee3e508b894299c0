use anyhow::Context;
use clap::Parser;
use crossbeam_channel as channel;
use std::path::PathBuf;

pub mod display;
pub mod hub;
pub mod midi;
pub mod mixer;
pub mod mpris;
pub mod player;
pub mod settings;
pub mod surface;
pub mod ticker;

use hub::Hub;
use player::Registry;
use settings::Settings;
use surface::XTouchOne;

#[derive(Parser, Debug)]
#[command(
    name = "MPRIS surface bridge",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Drives MPRIS players and the system volume from an X-Touch One"
)]
struct Args {
    #[arg(short, long, help = "Configuration file (TOML, YAML or JSON)")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Name prefix of the surface's MIDI ports")]
    port: Option<String>,

    #[arg(short, long, help = "Log level when RUST_LOG is not set")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings =
        Settings::load(args.config.as_deref()).context("Couldn't load settings")?;
    if let Some(port) = args.port {
        settings.port_prefix = port;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();

    log::debug!("Running with {settings:?}");

    match run(&settings) {
        Ok(()) => {
            log::info!("Exiting");
            Ok(())
        }
        Err(err) => {
            log::error!("{err:#}");
            Err(err)
        }
    }
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    let (evt_tx, evt_rx) = channel::unbounded();

    {
        let evt_tx = evt_tx.clone();
        ctrlc::set_handler(move || {
            let _ = evt_tx.send(hub::Event::Shutdown);
        })
        .context("Couldn't install termination handler")?;
    }

    let _port_in = {
        let evt_tx = evt_tx.clone();
        midi::PortIn::connect(&settings.client_name, &settings.port_prefix, move |msg| {
            match surface::xtouch_one::decode(msg) {
                Some(input) => {
                    let _ = evt_tx.send(input.into());
                }
                None => log::trace!("Ignoring {}", midi::msg::Displayable::from(msg)),
            }
        })
        .context("Couldn't connect surface input")?
    };

    let port_out = midi::PortOut::connect(&settings.client_name, &settings.port_prefix)
        .context("Couldn't connect surface output")?;

    let snapshot = mpris::snapshot().context("Couldn't list MPRIS players")?;
    let (rejected_tx, rejected_rx) = channel::unbounded();
    let mut registry = Registry::new(mpris::MprisConnector::new(evt_tx.clone(), rejected_tx));
    for (name, owner) in snapshot.iter() {
        // The active player, if any, is adopted by the hub setup.
        match registry.add_or_update(name, owner) {
            Ok(_) => (),
            Err(player::Error::Unknown(name)) => log::warn!("Player {name} vanished"),
            Err(err) => return Err(err).context("Couldn't register MPRIS players"),
        }
    }
    mpris::spawn_watcher(
        snapshot,
        settings.player_poll_interval(),
        rejected_rx,
        evt_tx.clone(),
    );

    let mixer = mixer::system().context("Couldn't connect system mixer")?;
    mixer::spawn_watcher(mixer::system, settings.volume_poll_interval(), evt_tx);

    let mut hub = Hub::new(
        registry,
        mixer,
        XTouchOne::new(port_out),
        settings.player_colors(),
    );
    hub.setup();
    hub.run(evt_rx, ticker::start(settings.tick_interval()));

    Ok(())
}

//! MPRIS playback services.
//!
//! `mpris::Player`s are bound to the thread which found them, so each
//! thread looks its player up by bus name.

use crossbeam_channel as channel;
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    hub::{Event, OwnerChange},
    player::{self, Backend, Connector, PlaybackStatus, Properties, Track},
};

/// Listener polling interval, also the delay for a listener to stop.
const LISTENER_INTERVAL_MS: u32 = 250;

/// Bus names of the players on the bus, with their owner.
pub type Snapshot = BTreeMap<Arc<str>, Arc<str>>;

pub fn snapshot() -> Result<Snapshot, player::Error> {
    let finder = mpris::PlayerFinder::new()?;
    let players = match finder.find_all() {
        Ok(players) => players,
        Err(mpris::FindingError::NoPlayerFound) => Vec::new(),
        Err(err) => return Err(err.into()),
    };

    Ok(players
        .iter()
        .map(|player| (player.bus_name().into(), player.unique_name().into()))
        .collect())
}

pub fn find_player(bus_name: &str) -> Result<mpris::Player, player::Error> {
    let finder = mpris::PlayerFinder::new()?;
    let players = match finder.find_all() {
        Ok(players) => players,
        Err(mpris::FindingError::NoPlayerFound) => Vec::new(),
        Err(err) => return Err(err.into()),
    };

    players
        .into_iter()
        .find(|player| player.bus_name() == bus_name)
        .ok_or_else(|| player::Error::Unknown(bus_name.into()))
}

/// Computes the ownership changes leading from `prev` to `cur`.
///
/// Removals come first, then owner changes and finally additions.
pub fn diff(prev: &Snapshot, cur: &Snapshot) -> Vec<OwnerChange> {
    let mut changes = Vec::new();

    for (name, owner) in prev {
        if !cur.contains_key(name) {
            changes.push(OwnerChange::Removed {
                name: name.clone(),
                owner: owner.clone(),
            });
        }
    }

    for (name, new_owner) in cur {
        match prev.get(name) {
            Some(old_owner) if old_owner != new_owner => {
                changes.push(OwnerChange::Renamed {
                    name: name.clone(),
                    old_owner: old_owner.clone(),
                    new_owner: new_owner.clone(),
                });
            }
            _ => (),
        }
    }

    for (name, owner) in cur {
        if !prev.contains_key(name) {
            changes.push(OwnerChange::Added {
                name: name.clone(),
                owner: owner.clone(),
            });
        }
    }

    changes
}

/// Tracks the players on the bus between two polls.
struct Watcher {
    prev: Snapshot,
    rejected_rx: channel::Receiver<Arc<str>>,
}

impl Watcher {
    /// Returns the changes leading to `cur`.
    ///
    /// Players which couldn't be registered are reported as added again.
    fn update(&mut self, cur: Snapshot) -> Vec<OwnerChange> {
        for name in self.rejected_rx.try_iter() {
            log::debug!("Will retry MPRIS player {name}");
            self.prev.remove(&name);
        }

        let changes = diff(&self.prev, &cur);
        self.prev = cur;

        changes
    }
}

/// Polls the bus for players showing up, leaving or changing owner.
///
/// `rejected_rx` receives the bus names of the players the registry
/// failed to connect.
pub fn spawn_watcher(
    prev: Snapshot,
    interval: Duration,
    rejected_rx: channel::Receiver<Arc<str>>,
    evt_tx: channel::Sender<Event>,
) {
    log::debug!("Spawning MPRIS players watcher");
    let mut watcher = Watcher { prev, rejected_rx };
    std::thread::spawn(move || loop {
        std::thread::sleep(interval);

        let cur = match snapshot() {
            Ok(cur) => cur,
            Err(err) => {
                log::warn!("MPRIS players watcher: {err}");
                continue;
            }
        };

        for change in watcher.update(cur) {
            log::trace!("MPRIS {change:?}");
            if evt_tx.send(change.into()).is_err() {
                log::debug!("Stopping MPRIS players watcher");
                return;
            }
        }
    });
}

pub struct MprisConnector {
    evt_tx: channel::Sender<Event>,
    rejected_tx: channel::Sender<Arc<str>>,
}

impl MprisConnector {
    pub fn new(evt_tx: channel::Sender<Event>, rejected_tx: channel::Sender<Arc<str>>) -> Self {
        Self {
            evt_tx,
            rejected_tx,
        }
    }
}

impl Connector for MprisConnector {
    type Backend = MprisBackend;

    fn connect(&mut self, name: &str, owner: &str) -> Result<MprisBackend, player::Error> {
        let player = match find_player(name) {
            Ok(player) => player,
            Err(err) => {
                let _ = self.rejected_tx.send(name.into());
                return Err(err);
            }
        };

        if player.unique_name() != owner {
            log::debug!(
                "MPRIS player {name} now owned by {} instead of {owner}",
                player.unique_name(),
            );
        }

        Ok(MprisBackend {
            name: name.into(),
            identity: player.identity().to_string(),
            player,
            evt_tx: self.evt_tx.clone(),
            must_stop: None,
        })
    }
}

pub struct MprisBackend {
    name: Arc<str>,
    identity: String,
    player: mpris::Player,
    evt_tx: channel::Sender<Event>,
    must_stop: Option<Arc<AtomicBool>>,
}

impl Backend for MprisBackend {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn fetch_properties(&mut self) -> Result<Properties, player::Error> {
        fetch_properties(&self.player)
    }

    fn play(&mut self) -> Result<(), player::Error> {
        Ok(self.player.play()?)
    }

    fn stop(&mut self) -> Result<(), player::Error> {
        Ok(self.player.stop()?)
    }

    fn play_pause(&mut self) -> Result<(), player::Error> {
        Ok(self.player.play_pause()?)
    }

    fn previous(&mut self) -> Result<(), player::Error> {
        Ok(self.player.previous()?)
    }

    fn next(&mut self) -> Result<(), player::Error> {
        Ok(self.player.next()?)
    }

    fn watch(&mut self, owner: Arc<str>) {
        self.unwatch();

        let must_stop = Arc::new(AtomicBool::new(false));

        let name = self.name.clone();
        let evt_tx = self.evt_tx.clone();
        let must_stop_cl = must_stop.clone();
        log::debug!("Spawning event loop for MPRIS player {name} owned by {owner}");
        std::thread::spawn(move || {
            if let Err(err) = event_loop(name, owner, evt_tx, must_stop_cl) {
                log::error!("MPRIS Player event loop: {err}");
            }
        });

        self.must_stop = Some(must_stop);
    }

    fn unwatch(&mut self) {
        if let Some(must_stop) = self.must_stop.take() {
            log::debug!("Stopping event loop for MPRIS player {}", self.name);
            must_stop.store(true, Ordering::Release);
        }
    }
}

impl Drop for MprisBackend {
    fn drop(&mut self) {
        self.unwatch();
    }
}

fn fetch_properties(player: &mpris::Player) -> Result<Properties, player::Error> {
    let status = player.get_playback_status()?.into();
    let track = Track::from(&player.get_metadata()?);

    Ok(Properties::new(status, track))
}

fn event_loop(
    name: Arc<str>,
    owner: Arc<str>,
    evt_tx: channel::Sender<Event>,
    stopper: Arc<AtomicBool>,
) -> Result<(), player::Error> {
    let player = find_player(&name)?;
    let mut properties = fetch_properties(&player)?;

    let mut progress = player.track_progress(LISTENER_INTERVAL_MS)?;
    loop {
        if stopper.load(Ordering::Acquire) {
            break;
        }

        let tick = progress.tick();
        if tick.player_quit {
            log::debug!("MPRIS player {name} shut down");
            break;
        }

        let status = tick.progress.playback_status().into();
        let track = Track::from(tick.progress.metadata());
        if !update(&mut properties, status, track) {
            continue;
        }

        let event = Event::Properties {
            owner: owner.clone(),
            properties: properties.clone(),
        };
        if evt_tx.send(event).is_err() {
            break;
        }
    }

    Ok(())
}

/// Returns `true` if `properties` changed.
fn update(properties: &mut Properties, status: PlaybackStatus, track: Track) -> bool {
    if properties.status == status && properties.track == track {
        return false;
    }

    properties.status = status;
    properties.track = track;

    true
}

fn first(values: Option<Vec<&str>>) -> String {
    values
        .and_then(|values| values.first().map(ToString::to_string))
        .unwrap_or_default()
}

impl From<&mpris::Metadata> for Track {
    fn from(meta: &mpris::Metadata) -> Self {
        Track {
            artist: first(meta.artists()),
            album_artist: first(meta.album_artists()),
            album: meta.album_name().unwrap_or_default().to_string(),
            title: meta.title().unwrap_or_default().to_string(),
            number: meta.track_number().unwrap_or_default(),
        }
    }
}

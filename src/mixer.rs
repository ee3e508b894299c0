use crossbeam_channel as channel;
use std::time::Duration;

#[cfg(feature = "pulsectl")]
use libpulse_binding::volume::{ChannelVolumes, Volume};
#[cfg(feature = "pulsectl")]
use pulsectl::controllers::{DeviceControl, SinkController};

use crate::hub::Event;

/// Volume changes smaller than this are considered noise.
const VOLUME_EPSILON: f64 = 1e-3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "pulsectl")]
    #[error("Volume controller error: {}", .0)]
    Controller(#[from] pulsectl::ControllerError),

    #[error("System volume control not available")]
    Unavailable,
}

/// System volume, normalized in `[0, 1]`.
pub trait Mixer {
    fn volume(&mut self) -> Result<f64, Error>;
    fn set_volume(&mut self, volume: f64) -> Result<(), Error>;
}

#[cfg(feature = "pulsectl")]
pub type SystemMixer = PulseMixer;
#[cfg(not(feature = "pulsectl"))]
pub type SystemMixer = NoMixer;

#[cfg(feature = "pulsectl")]
pub fn system() -> Result<SystemMixer, Error> {
    PulseMixer::try_new()
}

#[cfg(not(feature = "pulsectl"))]
pub fn system() -> Result<SystemMixer, Error> {
    log::warn!("System mixer not available");
    Ok(NoMixer)
}

/// Default PulseAudio sink.
#[cfg(feature = "pulsectl")]
pub struct PulseMixer {
    controller: SinkController,
}

#[cfg(feature = "pulsectl")]
impl PulseMixer {
    pub fn try_new() -> Result<Self, Error> {
        Ok(Self {
            controller: SinkController::create()?,
        })
    }

    fn normalized(volumes: &ChannelVolumes) -> f64 {
        (volumes.avg().0 as f64 / Volume::NORMAL.0 as f64).min(1f64)
    }
}

#[cfg(feature = "pulsectl")]
impl Mixer for PulseMixer {
    fn volume(&mut self) -> Result<f64, Error> {
        let device = self.controller.get_default_device()?;

        Ok(Self::normalized(&device.volume))
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), Error> {
        let device = self.controller.get_default_device()?;

        let mut volumes = device.volume;
        let channels = volumes.len();
        let value = (Volume::NORMAL.0 as f64 * volume.clamp(0f64, 1f64)) as u32;
        volumes.set(channels, Volume(value));

        log::debug!("Setting system volume to {volume:.2}");
        self.controller
            .set_device_volume_by_index(device.index, &volumes);

        Ok(())
    }
}

/// Stands in when the crate is built without a system mixer.
#[cfg(not(feature = "pulsectl"))]
pub struct NoMixer;

#[cfg(not(feature = "pulsectl"))]
impl Mixer for NoMixer {
    fn volume(&mut self) -> Result<f64, Error> {
        Err(Error::Unavailable)
    }

    fn set_volume(&mut self, _volume: f64) -> Result<(), Error> {
        log::debug!("Setting volume using system mixer not available");
        Err(Error::Unavailable)
    }
}

/// Reports system volume changes to the hub.
///
/// The mixer is built in the polling thread with `build`.
pub fn spawn_watcher<M, F>(build: F, interval: Duration, evt_tx: channel::Sender<Event>)
where
    M: Mixer,
    F: FnOnce() -> Result<M, Error> + Send + 'static,
{
    log::debug!("Spawning volume watcher");
    std::thread::spawn(move || {
        let mut mixer = match build() {
            Ok(mixer) => mixer,
            Err(err) => {
                log::error!("Volume watcher: {err}");
                return;
            }
        };

        let mut last = mixer.volume().ok();
        loop {
            std::thread::sleep(interval);

            let volume = match mixer.volume() {
                Ok(volume) => volume,
                Err(err) => {
                    log::trace!("Volume watcher: {err}");
                    continue;
                }
            };

            if !has_changed(last, volume) {
                continue;
            }

            last = Some(volume);
            if evt_tx.send(Event::Volume(volume)).is_err() {
                log::debug!("Stopping volume watcher");
                break;
            }
        }
    });
}

fn has_changed(last: Option<f64>, volume: f64) -> bool {
    last.map_or(true, |last| (last - volume).abs() > VOLUME_EPSILON)
}

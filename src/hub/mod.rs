//! Serialized handling of every event reaching the surface.
//!
//! Backend notifications, volume changes, surface input and clock ticks
//! are all funneled to the [`Hub`], which is the only owner of the
//! [`Registry`] and of the [`DisplayState`].

use crossbeam_channel as channel;
use std::{collections::HashMap, time::Instant};

pub mod event;
pub use event::{Event, OwnerChange};

pub mod state;
pub use state::{DisplayState, SegmentMode, TextMode};

use crate::{
    display::{lcd, pad_left, pad_right, Color, Invert, LcdPayload, SegmentPayload},
    midi::u7,
    mixer::Mixer,
    player::{self, ActiveChanged, Backend, Connector, PlaybackStatus, Properties, Registry, Track},
    surface::{Button, Control, Input, Led, Output},
};

const NO_PLAYER: &str = "NoPlayer";

const SEGMENT_NAME_LEN: usize = 9;
const SEGMENT_NUMBER_LEN: usize = 3;

fn local_time() -> chrono::NaiveTime {
    chrono::Local::now().time()
}

pub struct Hub<C: Connector, M: Mixer, O: Output> {
    registry: Registry<C>,
    mixer: M,
    output: O,
    state: DisplayState,
    track: Option<Track>,
    is_volume_suppressed: bool,
    colors: HashMap<String, Color>,
    clock: fn() -> chrono::NaiveTime,
}

impl<C: Connector, M: Mixer, O: Output> Hub<C, M, O> {
    pub fn new(registry: Registry<C>, mixer: M, output: O, colors: HashMap<String, Color>) -> Self {
        Self {
            registry,
            mixer,
            output,
            state: DisplayState::default(),
            track: None,
            is_volume_suppressed: false,
            colors,
            clock: local_time,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> chrono::NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Brings the surface in sync with the current volume and active backend.
    pub fn setup(&mut self) {
        self.output.reset();

        match self.mixer.volume() {
            Ok(volume) => self.output.set_fader(u7::from_normalized(volume)),
            Err(err) => log::warn!("Couldn't get initial volume: {err}"),
        }

        let active = self.registry.active_owner().cloned();
        self.on_active_changed(ActiveChanged(active));
    }

    /// Handles events until shutdown is requested or all producers are gone.
    pub fn run(mut self, evt_rx: channel::Receiver<Event>, tick_rx: channel::Receiver<Instant>) {
        loop {
            channel::select! {
                recv(evt_rx) -> event => match event {
                    Ok(Event::Shutdown) => {
                        log::info!("Shutting down");
                        break;
                    }
                    Ok(event) => self.handle(event),
                    Err(_) => {
                        log::debug!("Event channel closed");
                        break;
                    }
                },
                recv(tick_rx) -> tick => match tick {
                    Ok(_) => self.handle(Event::Tick),
                    Err(err) => {
                        log::error!("Error ticker channel: {err}");
                        break;
                    }
                },
            }
        }

        self.output.reset();
        log::debug!("Hub stopped");
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Owner(change) => self.on_owner_change(change),
            Event::Properties { owner, properties } => {
                if let Some(properties) = self.registry.on_properties(&owner, properties) {
                    self.on_properties(properties);
                }
            }
            Event::Volume(volume) => self.on_volume(volume),
            Event::Input(input) => self.on_input(input),
            Event::Tick => self.on_tick(),
            Event::Shutdown => log::debug!("Shutdown outside of the run loop"),
        }
    }

    fn on_owner_change(&mut self, change: OwnerChange) {
        use OwnerChange::*;

        let changed = match change {
            Added { name, owner } => match self.registry.add_or_update(&name, &owner) {
                Ok(changed) => changed,
                Err(err) => {
                    log::warn!("Couldn't add player {name}: {err}");
                    None
                }
            },
            Removed { name, owner } => self.registry.remove(&name, &owner),
            Renamed {
                name,
                old_owner,
                new_owner,
            } => {
                self.registry.rebind_owner(&name, &old_owner, &new_owner);
                None
            }
        };

        if let Some(changed) = changed {
            self.on_active_changed(changed);
        }
    }

    fn on_active_changed(&mut self, changed: ActiveChanged) {
        match changed.0 {
            Some(ref owner) => log::debug!("Active player owned by {owner}"),
            None => log::debug!("No active player"),
        }

        let properties = self.registry.fetch_active().unwrap_or_default();
        self.on_properties(properties);
    }

    fn on_properties(&mut self, properties: Properties) {
        let (stopped, playing) = match properties.status {
            PlaybackStatus::Unknown => (false, false),
            PlaybackStatus::Playing => (false, true),
            PlaybackStatus::Paused | PlaybackStatus::Stopped => (true, false),
        };
        self.output.set_led(Led::Stop, stopped);
        self.output.set_led(Led::Play, playing);

        if properties.track.is_different(self.track.as_ref()) {
            self.reset_scroll();
        }
        self.track = Some(properties.track);

        self.render();
    }

    fn on_input(&mut self, input: Input) {
        match input {
            Input::Pressed { velocity: 0, .. } => (),
            Input::Pressed { button, .. } => self.on_pressed(button),
            Input::Released(Button::FaderTouch) => {
                log::trace!("Fader released");
                self.is_volume_suppressed = false;
            }
            Input::Released(_) => (),
            Input::Control {
                control: Control::Fader,
                value,
            } => {
                if let Err(err) = self.mixer.set_volume(u7::to_normalized(value)) {
                    log::error!("Couldn't set volume: {err}");
                }
            }
            Input::Control {
                control: Control::Ring,
                value,
            } => {
                self.state.scroll = value as usize;
                self.render();
            }
        }
    }

    fn on_pressed(&mut self, button: Button) {
        use Button::*;

        match button {
            Previous => self.command("previous", |backend| {
                backend.previous()?;
                backend.play()
            }),
            Next => self.command("next", |backend| {
                backend.next()?;
                backend.play()
            }),
            Stop => self.command("stop", Backend::stop),
            Play => self.command("play_pause", Backend::play_pause),
            Encoder => {
                self.state.text_mode = self.state.text_mode.next();
                self.reset_scroll();
                self.render();
            }
            BankLeft => self.select_offset(-1),
            BankRight => self.select_offset(1),
            FaderTouch => {
                log::trace!("Fader touched");
                self.is_volume_suppressed = true;
            }
            Clock => {
                self.state.segment_mode = self.state.segment_mode.toggle();
                self.output
                    .set_led(Led::Clock, self.state.segment_mode.is_clock());
                self.render();
            }
        }
    }

    fn command<F>(&mut self, name: &str, f: F)
    where
        F: FnOnce(&mut C::Backend) -> Result<(), player::Error>,
    {
        let handle = match self.registry.active_mut() {
            Some(handle) => handle,
            None => {
                log::debug!("Ignoring {name}: no active player");
                return;
            }
        };

        let display_name = handle.display_name().clone();
        if let Err(err) = f(handle.backend_mut()) {
            log::error!("{display_name} {name}: {err}");
        }
    }

    fn select_offset(&mut self, offset: isize) {
        if let Some(changed) = self.registry.select_offset(offset) {
            self.on_active_changed(changed);
        }
    }

    fn on_volume(&mut self, volume: f64) {
        if self.is_volume_suppressed {
            log::trace!("Ignoring volume {volume:.2} while fader is touched");
            return;
        }

        self.output.set_fader(u7::from_normalized(volume));
    }

    fn on_tick(&mut self) {
        if self.state.segment_mode.is_clock() {
            log::trace!("Rendering clock");
            self.render();
        }
    }

    fn reset_scroll(&mut self) {
        self.state.scroll = 0;
        self.output.set_ring(0);
    }

    fn lcd_payload(&self) -> LcdPayload {
        let color = match self.registry.active() {
            Some(active) => self
                .colors
                .get(active.display_name_lower())
                .copied()
                .unwrap_or(Color::White),
            None => Color::Black,
        };

        let empty = Track::default();
        let track = self.track.as_ref().unwrap_or(&empty);
        let scroll = self.state.scroll;

        let (text, invert) = match self.state.text_mode {
            TextMode::ArtistTitle => {
                let mut text = pad_right(&track.artist, lcd::HALF_LEN, scroll);
                text.push_str(&pad_right(&track.title, lcd::HALF_LEN, scroll));
                (text, Invert::TOP)
            }
            TextMode::Artist => (pad_right(&track.artist, lcd::TEXT_LEN, scroll), Invert::BOTH),
            TextMode::Title => (pad_right(&track.title, lcd::TEXT_LEN, scroll), Invert::empty()),
            TextMode::Album => (pad_right(&track.album, lcd::TEXT_LEN, scroll), Invert::empty()),
        };

        LcdPayload::new(&text, color, invert)
    }

    fn segment_payload(&self) -> SegmentPayload {
        let number = match self.track {
            Some(ref track) if track.number != 0 => track.number.to_string(),
            _ => String::new(),
        };
        let number = pad_left(&number, SEGMENT_NUMBER_LEN);

        if self.state.segment_mode.is_clock() {
            let time = (self.clock)().format("%H%M%S");
            let mut text = pad_right(&format!("   {time}"), SEGMENT_NAME_LEN, 0);
            text.push_str(&number);

            return SegmentPayload::clock(&text);
        }

        let name = match self.registry.active() {
            Some(active) => format!("  {}", active.display_name()),
            None => NO_PLAYER.to_string(),
        };
        let mut text = pad_right(&name, SEGMENT_NAME_LEN, 0);
        text.push_str(&number);

        SegmentPayload::new(&text)
    }

    fn render(&mut self) {
        let lcd = self.lcd_payload();
        let segments = self.segment_payload();

        self.output.send_lcd(&lcd);
        self.output.send_segments(&segments);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        mixer,
        player::registry::tests::{FakeConnector, Journal, SPOTIFY, VLC},
    };

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Sent {
        Reset,
        Led(Led, bool),
        Fader(u8),
        Ring(u8),
        Lcd(LcdPayload),
        Segments(SegmentPayload),
    }

    #[derive(Default)]
    struct FakeOutput(Rc<RefCell<Vec<Sent>>>);

    impl Output for FakeOutput {
        fn reset(&mut self) {
            self.0.borrow_mut().push(Sent::Reset);
        }

        fn set_led(&mut self, led: Led, on: bool) {
            self.0.borrow_mut().push(Sent::Led(led, on));
        }

        fn set_fader(&mut self, value: u8) {
            self.0.borrow_mut().push(Sent::Fader(value));
        }

        fn set_ring(&mut self, value: u8) {
            self.0.borrow_mut().push(Sent::Ring(value));
        }

        fn send_lcd(&mut self, payload: &LcdPayload) {
            self.0.borrow_mut().push(Sent::Lcd(*payload));
        }

        fn send_segments(&mut self, payload: &SegmentPayload) {
            self.0.borrow_mut().push(Sent::Segments(*payload));
        }
    }

    #[derive(Default)]
    struct FakeMixer {
        volume: f64,
        set: Rc<RefCell<Vec<f64>>>,
        is_broken: bool,
    }

    impl Mixer for FakeMixer {
        fn volume(&mut self) -> Result<f64, mixer::Error> {
            if self.is_broken {
                return Err(mixer::Error::Unavailable);
            }

            Ok(self.volume)
        }

        fn set_volume(&mut self, volume: f64) -> Result<(), mixer::Error> {
            if self.is_broken {
                return Err(mixer::Error::Unavailable);
            }

            self.set.borrow_mut().push(volume);
            self.volume = volume;
            Ok(())
        }
    }

    type TestHub = Hub<FakeConnector, FakeMixer, FakeOutput>;

    struct Harness {
        hub: TestHub,
        sent: Rc<RefCell<Vec<Sent>>>,
        journal: Journal,
        volumes: Rc<RefCell<Vec<f64>>>,
    }

    impl Harness {
        fn new(connector: FakeConnector) -> Self {
            let journal = connector.journal.clone();
            let output = FakeOutput::default();
            let sent = output.0.clone();
            let mixer = FakeMixer {
                volume: 0.5,
                ..FakeMixer::default()
            };
            let volumes = mixer.set.clone();

            let colors = [("spotify", Color::Green), ("vlc", Color::Red)]
                .into_iter()
                .map(|(name, color)| (name.to_string(), color))
                .collect();

            let hub = Hub::new(Registry::new(connector), mixer, output, colors)
                .with_clock(|| chrono::NaiveTime::from_hms_opt(12, 34, 56).unwrap());

            Self {
                hub,
                sent,
                journal,
                volumes,
            }
        }

        fn take_sent(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.sent.borrow_mut())
        }

        fn take_journal(&self) -> Vec<String> {
            std::mem::take(&mut *self.journal.borrow_mut())
        }

        fn add(&mut self, name: &str, owner: &str) {
            self.hub.handle(
                OwnerChange::Added {
                    name: name.into(),
                    owner: owner.into(),
                }
                .into(),
            );
        }

        fn press(&mut self, button: Button) {
            self.hub.handle(Input::pressed(button).into());
        }

        fn properties(&mut self, owner: &str, properties: Properties) {
            self.hub.handle(Event::Properties {
                owner: owner.into(),
                properties,
            });
        }

        fn last_lcd(&self) -> Option<LcdPayload> {
            self.sent.borrow().iter().rev().find_map(|sent| match sent {
                Sent::Lcd(payload) => Some(*payload),
                _ => None,
            })
        }

        fn last_segments(&self) -> Option<SegmentPayload> {
            self.sent.borrow().iter().rev().find_map(|sent| match sent {
                Sent::Segments(payload) => Some(*payload),
                _ => None,
            })
        }
    }

    fn track(artist: &str, title: &str) -> Track {
        Track {
            artist: artist.to_string(),
            title: title.to_string(),
            ..Track::default()
        }
    }

    fn playing(artist: &str, title: &str) -> Properties {
        Properties::new(PlaybackStatus::Playing, track(artist, title))
    }

    #[test]
    fn setup_without_backend() {
        let mut h = Harness::new(FakeConnector::default());
        h.hub.setup();

        assert_eq!(
            h.take_sent(),
            vec![
                Sent::Reset,
                Sent::Fader(63),
                Sent::Led(Led::Stop, false),
                Sent::Led(Led::Play, false),
                Sent::Ring(0),
                Sent::Lcd(LcdPayload::new("              ", Color::Black, Invert::TOP)),
                Sent::Segments(SegmentPayload::new("NoPlayer    ")),
            ]
        );
    }

    #[test]
    fn no_backend_follows_text_mode() {
        let mut h = Harness::new(FakeConnector::default());
        h.hub.setup();

        let lcd = h.last_lcd().unwrap();
        assert_eq!(lcd.color_code(), 0x10);
        assert_eq!(lcd.text(), b"              ");

        h.press(Button::Encoder);
        let lcd = h.last_lcd().unwrap();
        assert_eq!(lcd.color_code(), 0x30);
        assert_eq!(lcd.text(), b"              ");
        assert_eq!(
            &lcd.as_bytes()[..7],
            &[0x00, 0x20, 0x32, 0x41, 0x4c, 0x00, 0x30]
        );
    }

    #[test]
    fn setup_without_mixer() {
        let mut h = Harness::new(FakeConnector::default());
        h.hub.mixer.is_broken = true;
        h.hub.setup();

        let sent = h.take_sent();
        assert_eq!(sent[0], Sent::Reset);
        assert!(!sent.iter().any(|sent| matches!(sent, Sent::Fader(_))));
    }

    #[test]
    fn setup_adopts_active_backend() {
        let connector =
            FakeConnector::default().with_properties("Spotify", playing("Daft Punk", "Da Funk"));
        let mut h = Harness::new(connector);
        let _ = h.hub.registry.add_or_update(SPOTIFY, ":1.2").unwrap();

        h.hub.setup();

        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("Daft PuDa Funk", Color::Green, Invert::TOP)
        );
        assert_eq!(
            h.last_segments().unwrap(),
            SegmentPayload::new("  Spotify   ")
        );
    }

    #[test]
    fn spotify_appears_and_plays() {
        let mut h = Harness::new(FakeConnector::default());
        h.hub.setup();
        h.take_sent();

        h.add(SPOTIFY, ":1.2");
        h.take_sent();

        h.properties(":1.2", playing("A", "B"));
        assert_eq!(h.last_lcd().unwrap().color_code(), 0x12);

        assert_eq!(
            h.take_sent(),
            vec![
                Sent::Led(Led::Stop, false),
                Sent::Led(Led::Play, true),
                Sent::Ring(0),
                Sent::Lcd(LcdPayload::new("A      B      ", Color::Green, Invert::TOP)),
                Sent::Segments(SegmentPayload::new("  Spotify   ")),
            ]
        );
    }

    #[test]
    fn status_leds() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(VLC, ":1.3");

        for (status, stopped, playing) in [
            (PlaybackStatus::Paused, true, false),
            (PlaybackStatus::Stopped, true, false),
            (PlaybackStatus::Playing, false, true),
            (PlaybackStatus::Unknown, false, false),
        ] {
            h.take_sent();
            h.properties(":1.3", Properties::new(status, Track::default()));

            let sent = h.take_sent();
            assert_eq!(sent[0], Sent::Led(Led::Stop, stopped));
            assert_eq!(sent[1], Sent::Led(Led::Play, playing));
        }
    }

    #[test]
    fn same_track_keeps_scroll() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");
        h.properties(":1.2", playing("Long artist name", "B"));

        h.hub.handle(
            Input::Control {
                control: Control::Ring,
                value: 5,
            }
            .into(),
        );
        assert_eq!(h.hub.state().scroll, 5);
        assert_eq!(&h.last_lcd().unwrap().text()[..7], b"artist ");

        h.properties(":1.2", playing("Long artist name", "B"));
        assert_eq!(h.hub.state().scroll, 5);

        h.take_sent();
        h.properties(":1.2", playing("Long artist name", "C"));
        assert_eq!(h.hub.state().scroll, 0);
        assert!(h.take_sent().contains(&Sent::Ring(0)));
    }

    #[test]
    fn encoder_cycles_text_modes() {
        let props = Properties::new(
            PlaybackStatus::Playing,
            Track {
                artist: "Artist".to_string(),
                title: "Title".to_string(),
                album: "Album".to_string(),
                ..Track::default()
            },
        );
        let mut h = Harness::new(FakeConnector::default().with_properties("vlc", props));
        h.add(VLC, ":1.3");
        h.hub.handle(
            Input::Control {
                control: Control::Ring,
                value: 2,
            }
            .into(),
        );

        h.take_sent();
        h.press(Button::Encoder);
        assert_eq!(h.hub.state().text_mode, TextMode::Artist);
        assert_eq!(h.hub.state().scroll, 0);
        assert_eq!(
            h.take_sent(),
            vec![
                Sent::Ring(0),
                Sent::Lcd(LcdPayload::new("Artist        ", Color::Red, Invert::BOTH)),
                Sent::Segments(SegmentPayload::new("  vlc       ")),
            ]
        );

        h.press(Button::Encoder);
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("Title         ", Color::Red, Invert::empty())
        );

        h.press(Button::Encoder);
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("Album         ", Color::Red, Invert::empty())
        );

        h.press(Button::Encoder);
        assert_eq!(h.hub.state().text_mode, TextMode::ArtistTitle);
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("Artist Title  ", Color::Red, Invert::TOP)
        );
    }

    #[test]
    fn unmapped_color_is_white() {
        let mut h = Harness::new(FakeConnector::default());
        h.add("org.mpris.MediaPlayer2.Rhythmbox", ":1.4");

        assert_eq!(h.last_lcd().unwrap().color_code(), 0x17);
    }

    #[test]
    fn null_velocity_press_is_ignored() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(VLC, ":1.3");
        h.take_sent();
        h.take_journal();

        for button in [Button::Play, Button::Encoder, Button::Clock, Button::FaderTouch] {
            h.hub.handle(Input::Pressed { button, velocity: 0 }.into());
        }

        assert!(h.take_sent().is_empty());
        assert!(h.take_journal().is_empty());
        assert_eq!(h.hub.state(), DisplayState::default());
    }

    #[test]
    fn transport_commands() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(VLC, ":1.3");
        h.take_journal();

        h.press(Button::Previous);
        h.press(Button::Next);
        h.press(Button::Stop);
        h.press(Button::Play);

        assert_eq!(
            h.take_journal(),
            vec![
                "vlc previous",
                "vlc play",
                "vlc next",
                "vlc play",
                "vlc stop",
                "vlc play_pause",
            ]
        );
    }

    #[test]
    fn command_failure_is_not_fatal() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(VLC, ":1.3");
        h.hub.registry.active_mut().unwrap().backend_mut().reachable = false;
        h.take_journal();

        h.press(Button::Previous);
        h.press(Button::Play);

        // previous failed: play not attempted
        assert_eq!(h.take_journal(), vec!["vlc previous", "vlc play_pause"]);
    }

    #[test]
    fn commands_without_backend() {
        let mut h = Harness::new(FakeConnector::default());

        for button in [Button::Previous, Button::Next, Button::Stop, Button::Play] {
            h.press(button);
        }
        h.press(Button::BankRight);

        assert!(h.take_journal().is_empty());
        assert!(h.take_sent().is_empty());
    }

    #[test]
    fn fader_touch_suppresses_volume_feedback() {
        let mut h = Harness::new(FakeConnector::default());

        h.hub.handle(Event::Volume(1.0));
        assert_eq!(h.take_sent(), vec![Sent::Fader(127)]);

        h.press(Button::FaderTouch);
        h.hub.handle(Event::Volume(0.2));
        assert!(h.take_sent().is_empty());

        h.hub.handle(Input::Released(Button::FaderTouch).into());
        h.hub.handle(Event::Volume(0.0));
        assert_eq!(h.take_sent(), vec![Sent::Fader(0)]);
    }

    #[test]
    fn fader_sets_volume() {
        let mut h = Harness::new(FakeConnector::default());

        h.hub.handle(
            Input::Control {
                control: Control::Fader,
                value: 127,
            }
            .into(),
        );
        h.hub.handle(
            Input::Control {
                control: Control::Fader,
                value: 0,
            }
            .into(),
        );

        assert_eq!(*h.volumes.borrow(), vec![1.0, 0.0]);
    }

    #[test]
    fn fader_with_broken_mixer() {
        let mut h = Harness::new(FakeConnector::default());
        h.hub.mixer.is_broken = true;

        h.hub.handle(
            Input::Control {
                control: Control::Fader,
                value: 64,
            }
            .into(),
        );

        assert!(h.volumes.borrow().is_empty());
    }

    #[test]
    fn clock_mode() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");

        // Ticks only render in clock mode
        h.take_sent();
        h.hub.handle(Event::Tick);
        assert!(h.take_sent().is_empty());

        h.press(Button::Clock);
        let sent = h.take_sent();
        assert_eq!(sent[0], Sent::Led(Led::Clock, true));
        let expected = SegmentPayload::clock("   123456   ");
        assert_eq!(sent[2], Sent::Segments(expected));
        assert_eq!(expected.dots(), [0x10, 0x00]);

        h.hub.handle(Event::Tick);
        assert_eq!(h.last_segments().unwrap(), expected);

        h.take_sent();
        h.press(Button::Clock);
        assert_eq!(h.sent.borrow()[0], Sent::Led(Led::Clock, false));
        assert_eq!(
            h.last_segments().unwrap(),
            SegmentPayload::new("  Spotify   ")
        );
    }

    #[test]
    fn track_number_on_segments() {
        let props = Properties::new(
            PlaybackStatus::Playing,
            Track {
                number: 7,
                ..Track::default()
            },
        );
        let mut h = Harness::new(FakeConnector::default().with_properties("vlc", props));
        h.add(VLC, ":1.3");

        assert_eq!(
            h.last_segments().unwrap(),
            SegmentPayload::new("  vlc      7")
        );
    }

    #[test]
    fn bank_switching() {
        let connector = FakeConnector::default()
            .with_properties("Spotify", playing("A", "B"))
            .with_properties("vlc", playing("C", "D"));
        let mut h = Harness::new(connector);
        h.add(SPOTIFY, ":1.1");
        h.add(VLC, ":1.2");
        assert_eq!(&h.last_lcd().unwrap().text()[..1], b"A");

        h.press(Button::BankRight);
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("C      D      ", Color::Red, Invert::TOP)
        );
        assert_eq!(h.last_segments().unwrap(), SegmentPayload::new("  vlc       "));

        h.press(Button::BankLeft);
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("A      B      ", Color::Green, Invert::TOP)
        );
    }

    #[test]
    fn removing_last_backend() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");
        h.properties(":1.2", playing("A", "B"));
        h.take_sent();

        h.hub.handle(
            OwnerChange::Removed {
                name: SPOTIFY.into(),
                owner: ":1.2".into(),
            }
            .into(),
        );

        assert!(h.sent.borrow().contains(&Sent::Led(Led::Play, false)));
        assert_eq!(
            h.last_lcd().unwrap(),
            LcdPayload::new("              ", Color::Black, Invert::TOP)
        );
        assert_eq!(
            h.last_segments().unwrap(),
            SegmentPayload::new("NoPlayer    ")
        );
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");
        h.take_sent();

        h.properties(":1.99", playing("X", "Y"));
        h.hub.handle(
            OwnerChange::Removed {
                name: VLC.into(),
                owner: ":1.5".into(),
            }
            .into(),
        );
        h.add("org.mpris.MediaPlayer2.broken", ":1.6");

        assert!(h.take_sent().is_empty());
    }

    #[test]
    fn inactive_backend_properties_are_cached_only() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.1");
        h.add(VLC, ":1.2");
        h.take_sent();

        h.properties(":1.2", playing("C", "D"));
        assert!(h.take_sent().is_empty());
        assert_eq!(
            h.hub.registry.get(":1.2").unwrap().properties(),
            &playing("C", "D")
        );
    }

    #[test]
    fn renamed_owner_keeps_active() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");

        h.hub.handle(
            OwnerChange::Renamed {
                name: SPOTIFY.into(),
                old_owner: ":1.2".into(),
                new_owner: ":1.8".into(),
            }
            .into(),
        );
        h.take_sent();

        h.properties(":1.8", playing("A", "B"));
        assert_eq!(&h.last_lcd().unwrap().text()[..1], b"A");
    }

    #[test]
    fn shutdown_resets_surface() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");
        h.properties(":1.2", playing("A", "B"));

        let sent = h.sent.clone();
        let (evt_tx, evt_rx) = channel::unbounded();
        evt_tx.send(Event::Volume(1.0)).unwrap();
        evt_tx.send(Event::Shutdown).unwrap();
        evt_tx.send(Event::Volume(0.0)).unwrap();

        // producers are still connected: only the shutdown event ends the loop
        h.hub.run(evt_rx, channel::never());

        let sent = sent.borrow();
        assert_eq!(sent[sent.len() - 2..], [Sent::Fader(127), Sent::Reset]);
        assert_eq!(evt_tx.len(), 1);
    }

    #[test]
    fn render_is_idempotent() {
        let mut h = Harness::new(FakeConnector::default());
        h.add(SPOTIFY, ":1.2");
        h.properties(":1.2", playing("Ünïcödé", "Title"));

        h.take_sent();
        h.hub.render();
        let first = h.take_sent();
        h.hub.render();

        assert_eq!(first, h.take_sent());
    }
}

use std::sync::Arc;

use super::{Error, Msg};

/// Finds the first port whose name starts with `prefix`.
///
/// Ports created by this client are skipped so that we never loop back
/// to ourselves.
fn find_port<IO: midir::MidiIO>(
    io: &IO,
    client_name: &str,
    prefix: &str,
) -> Result<(Arc<str>, IO::Port), Error> {
    for port in io.ports().iter() {
        let name = io.port_name(port)?;
        if name.starts_with(client_name) {
            continue;
        }

        if name.starts_with(prefix) {
            return Ok((name.into(), port.clone()));
        }
    }

    Err(Error::PortNotFound(prefix.into()))
}

pub struct PortIn {
    name: Arc<str>,
    _conn: midir::MidiInputConnection<()>,
}

impl PortIn {
    /// Connects the first input port matching `prefix`.
    ///
    /// `callback` is invoked from the MIDI backend thread for each incoming message.
    pub fn connect<C>(client_name: &str, prefix: &str, mut callback: C) -> Result<Self, Error>
    where
        C: FnMut(&[u8]) + Send + 'static,
    {
        let client_port_name = format!("{client_name} In");
        let midi_in = midir::MidiInput::new(&client_port_name)?;
        let (name, port) = find_port(&midi_in, client_name, prefix)?;

        log::info!("Opening in port {name}");
        let conn = midi_in
            .connect(
                &port,
                &client_port_name,
                move |_ts, msg, _| callback(msg),
                (),
            )
            .map_err(|err| {
                log::error!("Failed to connect {name}: {err}");
                Error::Connection(name.clone())
            })?;

        log::info!("Connected for Input to {name}");

        Ok(Self { name, _conn: conn })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct PortOut {
    name: Arc<str>,
    conn: midir::MidiOutputConnection,
}

impl PortOut {
    pub fn connect(client_name: &str, prefix: &str) -> Result<Self, Error> {
        let client_port_name = format!("{client_name} Out");
        let midi_out = midir::MidiOutput::new(&client_port_name)?;
        let (name, port) = find_port(&midi_out, client_name, prefix)?;

        log::info!("Opening out port {name}");
        let conn = midi_out.connect(&port, &client_port_name).map_err(|err| {
            log::error!("Failed to connect {name}: {err}");
            Error::Connection(name.clone())
        })?;

        log::info!("Connected for Output to {name}");

        Ok(Self { name, conn })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        log::trace!("Sending {}", msg.display());

        self.conn.send(msg).map_err(|source| Error::Send {
            msg: msg.display().to_owned(),
            source,
        })
    }
}

use std::{collections::BTreeMap, sync::Arc};

use super::{Backend, Connector, Error, Properties};

/// The active backend changed, `None` meaning no backend left.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct ActiveChanged(pub Option<Arc<str>>);

#[derive(Debug)]
pub struct Handle<B> {
    name: Arc<str>,
    owner: Arc<str>,
    display_name: Arc<str>,
    display_name_lower: Arc<str>,
    properties: Properties,
    backend: B,
}

impl<B: Backend> Handle<B> {
    /// Stable service name, e.g. `org.mpris.MediaPlayer2.spotify`.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Volatile bus connection owning the service.
    pub fn owner(&self) -> &Arc<str> {
        &self.owner
    }

    pub fn display_name(&self) -> &Arc<str> {
        &self.display_name
    }

    pub fn display_name_lower(&self) -> &str {
        &self.display_name_lower
    }

    /// Last known properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn fetch_properties(&mut self) -> &Properties {
        match self.backend.fetch_properties() {
            Ok(properties) => self.properties = properties,
            Err(err) => log::warn!("Couldn't fetch {} properties: {err}", self.display_name),
        }

        &self.properties
    }
}

/// Live backends keyed by owner, with the active backend selection.
///
/// Keys are kept sorted so that cycling through backends is reproducible.
pub struct Registry<C: Connector> {
    connector: C,
    backends: BTreeMap<Arc<str>, Handle<C::Backend>>,
    active: Option<Arc<str>>,
}

impl<C: Connector> Registry<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            backends: BTreeMap::new(),
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, owner: &str) -> Option<&Handle<C::Backend>> {
        self.backends.get(owner)
    }

    pub fn active_owner(&self) -> Option<&Arc<str>> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Handle<C::Backend>> {
        self.active
            .as_ref()
            .and_then(|owner| self.backends.get(owner))
    }

    pub fn active_mut(&mut self) -> Option<&mut Handle<C::Backend>> {
        match self.active {
            Some(ref owner) => self.backends.get_mut(owner),
            None => None,
        }
    }

    /// Fetches the active backend's current properties.
    ///
    /// Falls back to the last known properties if the backend can't be reached.
    pub fn fetch_active(&mut self) -> Option<Properties> {
        self.active_mut()
            .map(|handle| handle.fetch_properties().clone())
    }

    fn is_active(&self, owner: &str) -> bool {
        self.active.as_deref() == Some(owner)
    }

    fn owner_of(&self, name: &str) -> Option<Arc<str>> {
        self.backends
            .values()
            .find(|handle| handle.name.as_ref() == name)
            .map(|handle| handle.owner.clone())
    }

    pub fn add_or_update(
        &mut self,
        name: &str,
        owner: &str,
    ) -> Result<Option<ActiveChanged>, Error> {
        if let Some(cur_owner) = self.owner_of(name) {
            if cur_owner.as_ref() != owner {
                self.rebind_owner(name, &cur_owner, owner);
            }

            return Ok(None);
        }

        log::info!("Adding player {name} owned by {owner}");

        let mut backend = self.connector.connect(name, owner)?;
        let owner: Arc<str> = owner.into();

        let display_name: Arc<str> = match backend.identity() {
            "" => name.into(),
            identity => identity.into(),
        };

        let properties = backend.fetch_properties().unwrap_or_else(|err| {
            log::warn!("Couldn't fetch {display_name} initial properties: {err}");
            Properties::default()
        });

        backend.watch(owner.clone());

        self.backends.insert(
            owner.clone(),
            Handle {
                name: name.into(),
                owner: owner.clone(),
                display_name_lower: display_name.to_lowercase().into(),
                display_name,
                properties,
                backend,
            },
        );

        if self.active.is_none() {
            self.active = Some(owner.clone());
            return Ok(Some(ActiveChanged(Some(owner))));
        }

        Ok(None)
    }

    pub fn remove(&mut self, name: &str, owner: &str) -> Option<ActiveChanged> {
        match self.backends.get(owner) {
            Some(handle) if handle.name.as_ref() == name => (),
            _ => {
                log::debug!("Ignoring removal of unknown player {name} owned by {owner}");
                return None;
            }
        }

        log::info!("Removing player {name} owned by {owner}");

        // Elect the successor while the removed backend is still listed
        // so that the selection steps from its position.
        let mut changed = None;
        if self.is_active(owner) {
            changed = self.select_offset(-1);
        }

        if let Some(mut handle) = self.backends.remove(owner) {
            handle.backend.unwatch();
        }

        if self.is_active(owner) {
            self.active = None;
            changed = Some(ActiveChanged(None));
        }

        changed
    }

    pub fn rebind_owner(&mut self, name: &str, old_owner: &str, new_owner: &str) {
        match self.backends.get(old_owner) {
            Some(handle) if handle.name.as_ref() == name => (),
            _ => {
                log::debug!("Ignoring owner change for unknown player {name} owned by {old_owner}");
                return;
            }
        }

        if self.backends.contains_key(new_owner) {
            log::warn!("Can't move player {name} to {new_owner}: owner already registered");
            return;
        }

        log::info!("Changing owner of player {name} from {old_owner} to {new_owner}");

        let new_owner: Arc<str> = new_owner.into();
        if let Some(mut handle) = self.backends.remove(old_owner) {
            handle.owner = new_owner.clone();
            handle.backend.unwatch();
            handle.backend.watch(new_owner.clone());

            self.backends.insert(new_owner.clone(), handle);
        }

        if self.is_active(old_owner) {
            self.active = Some(new_owner);
        }
    }

    /// Cycles the active backend by `offset` positions.
    pub fn select_offset(&mut self, offset: isize) -> Option<ActiveChanged> {
        let count = self.backends.len();
        if count < 2 {
            return None;
        }

        let cur = self
            .active
            .as_ref()
            .and_then(|active| self.backends.keys().position(|owner| owner == active))
            .map_or(-1, |pos| pos as isize);

        let new_pos = (cur + offset).rem_euclid(count as isize) as usize;
        let owner = self.backends.keys().nth(new_pos).cloned()?;

        if let Some(handle) = self.backends.get(&owner) {
            log::info!("Selecting player {}", handle.display_name);
        }
        self.active = Some(owner.clone());

        Some(ActiveChanged(Some(owner)))
    }

    /// Caches `properties` for `owner`.
    ///
    /// Returns the properties back if `owner` is the active backend.
    pub fn on_properties(&mut self, owner: &str, properties: Properties) -> Option<Properties> {
        let is_active = self.is_active(owner);

        match self.backends.get_mut(owner) {
            Some(handle) => {
                handle.properties = properties;
                is_active.then(|| handle.properties.clone())
            }
            None => {
                log::debug!("Ignoring properties for unknown owner {owner}");
                None
            }
        }
    }
}

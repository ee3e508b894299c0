#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub title: String,
    pub number: i32,
}

impl Track {
    /// Whether `self` should be displayed as a new track compared to `other`.
    ///
    /// There is always a change when there was no previous track.
    pub fn is_different(&self, other: Option<&Track>) -> bool {
        other.map_or(true, |other| self != other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            artist: "Nina Simone".to_string(),
            album_artist: "Nina Simone".to_string(),
            album: "Pastel Blues".to_string(),
            title: "Sinnerman".to_string(),
            number: 5,
        }
    }

    #[test]
    fn same_track() {
        let t = track();
        assert!(!t.is_different(Some(&t)));
        assert!(!t.is_different(Some(&t.clone())));
        assert!(!Track::default().is_different(Some(&Track::default())));
    }

    #[test]
    fn no_previous_track() {
        assert!(track().is_different(None));
        assert!(Track::default().is_different(None));
    }

    #[test]
    fn any_field_differs() {
        let t = track();

        let mut other = t.clone();
        other.artist.push('!');
        assert!(t.is_different(Some(&other)));

        let mut other = t.clone();
        other.album_artist.clear();
        assert!(t.is_different(Some(&other)));

        let mut other = t.clone();
        other.album = "Wild Is the Wind".to_string();
        assert!(t.is_different(Some(&other)));

        let mut other = t.clone();
        other.title = "Be My Husband".to_string();
        assert!(t.is_different(Some(&other)));

        let mut other = t.clone();
        other.number = 6;
        assert!(t.is_different(Some(&other)));
    }
}

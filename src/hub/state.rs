#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
    #[default]
    ArtistTitle,
    Artist,
    Title,
    Album,
}

impl TextMode {
    pub fn next(self) -> Self {
        use TextMode::*;

        match self {
            ArtistTitle => Artist,
            Artist => Title,
            Title => Album,
            Album => ArtistTitle,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentMode {
    #[default]
    PlayerInfo,
    Clock,
}

impl SegmentMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::PlayerInfo => Self::Clock,
            Self::Clock => Self::PlayerInfo,
        }
    }

    pub fn is_clock(self) -> bool {
        matches!(self, Self::Clock)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub text_mode: TextMode,
    pub scroll: usize,
    pub segment_mode: SegmentMode,
}

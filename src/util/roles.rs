//! Detection of StarCraft rank and race roles.
//!
//! Community servers assign ladder ranks as roles named `"<letter> rank"` and races as
//! roles named after the race. The livestreams list sorts and decorates members by
//! these roles.

/// Sort key used for members without a detected rank or race.
pub const UNKNOWN_ORDER: u8 = 100;

/// StarCraft ladder rank, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
    E,
    F,
    U,
}

impl Rank {
    /// Detects a rank from a role name such as `"A rank"`.
    ///
    /// The letter is case sensitive and the label must be exactly `rank`.
    pub fn from_role_name(name: &str) -> Option<Self> {
        let mut parts = name.split_whitespace();
        let letter = parts.next()?;
        if parts.next() != Some("rank") {
            return None;
        }

        match letter {
            "S" => Some(Rank::S),
            "A" => Some(Rank::A),
            "B" => Some(Rank::B),
            "C" => Some(Rank::C),
            "D" => Some(Rank::D),
            "E" => Some(Rank::E),
            "F" => Some(Rank::F),
            "U" => Some(Rank::U),
            _ => None,
        }
    }

    pub fn order(self) -> u8 {
        self as u8
    }

    /// Lowercase letter, as used in emoji names like `:ranka:`.
    pub fn letter(self) -> &'static str {
        match self {
            Rank::S => "s",
            Rank::A => "a",
            Rank::B => "b",
            Rank::C => "c",
            Rank::D => "d",
            Rank::E => "e",
            Rank::F => "f",
            Rank::U => "u",
        }
    }
}

/// StarCraft race preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Race {
    Terran,
    Protoss,
    Zerg,
    RacepickRandom,
    Raceless,
}

impl Race {
    /// Detects a race from a role name, case insensitively.
    pub fn from_role_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "terran" => Some(Race::Terran),
            "protoss" => Some(Race::Protoss),
            "zerg" => Some(Race::Zerg),
            "racepick/random" => Some(Race::RacepickRandom),
            "raceless" => Some(Race::Raceless),
            _ => None,
        }
    }

    pub fn order(self) -> u8 {
        match self {
            Race::Terran => 0,
            Race::Protoss => 1,
            Race::Zerg => 2,
            Race::RacepickRandom => 5,
            Race::Raceless => 6,
        }
    }

    /// Internal emoji name for the race, as used in `:name:` tokens.
    pub fn emoji_name(self) -> &'static str {
        match self {
            Race::Terran => "terran",
            Race::Protoss => "protoss",
            Race::Zerg => "zerg",
            Race::RacepickRandom => "racepick_random",
            Race::Raceless => "raceless",
        }
    }
}

/// Rank and race of a guild member, as far as their roles tell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleMeta {
    pub rank: Option<Rank>,
    pub race: Option<Race>,
}

impl RoleMeta {
    /// Collects rank and race from a member's role names.
    ///
    /// When a member has several roles of the same kind, the last one wins.
    pub fn from_role_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut meta = RoleMeta::default();
        for name in names {
            if let Some(race) = Race::from_role_name(name) {
                meta.race = Some(race);
            } else if let Some(rank) = Rank::from_role_name(name) {
                meta.rank = Some(rank);
            }
        }
        meta
    }

    pub fn rank_order(&self) -> u8 {
        self.rank.map_or(UNKNOWN_ORDER, Rank::order)
    }

    pub fn race_order(&self) -> u8 {
        self.race.map_or(UNKNOWN_ORDER, Race::order)
    }
}

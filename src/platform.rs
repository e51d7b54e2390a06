use anyhow::{Result, bail};
use bitflags::bitflags;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

bitflags! {
    /// Game stores that can be searched. One bit per store; aliases share a bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Platform: u32 {
        const STEAM = 1 << 0;
        /// Epic Games Store
        const EPIC = 1 << 1;
        const EGS = Self::EPIC.bits();
        /// Microsoft Store / Xbox app
        const MICROSOFT = 1 << 2;
        const MSSTORE = Self::MICROSOFT.bits();
        /// GOG Galaxy
        const GOG = 1 << 3;
        const DISCORD = 1 << 4;

        const ALL = Self::STEAM.bits()
            | Self::EPIC.bits()
            | Self::MICROSOFT.bits()
            | Self::GOG.bits()
            | Self::DISCORD.bits();
    }
}

const DISPLAY_NAMES: &[(Platform, &str)] = &[
    (Platform::STEAM, "Steam"),
    (Platform::EPIC, "Epic Games Store"),
    (Platform::MICROSOFT, "Microsoft Store"),
    (Platform::GOG, "GOG Galaxy"),
    (Platform::DISCORD, "Discord"),
];

impl Platform {
    /// The individual stores in this set, lowest bit first. Each store appears once no matter how
    /// many aliases were used to build the set, and the empty set yields nothing.
    pub fn unique_flags(self) -> impl Iterator<Item = Platform> {
        (0..u32::BITS)
            .map(|shift| 1u32 << shift)
            .filter(move |bit| self.bits() & bit != 0)
            .filter_map(Platform::from_bits)
    }

    /// Human readable store name. Only meaningful for single stores.
    pub fn display_name(self) -> &'static str {
        DISPLAY_NAMES
            .iter()
            .find(|(platform, _)| *platform == self)
            .map_or("multiple platforms", |(_, name)| *name)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::ALL
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let names: Vec<_> = self.unique_flags().map(Platform::display_name).collect();
        write!(f, "{}", names.join(", "))
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let platform = match s.trim().to_ascii_lowercase().as_str() {
            "steam" => Platform::STEAM,
            "epic" | "egs" => Platform::EPIC,
            "microsoft" | "msstore" => Platform::MICROSOFT,
            "gog" => Platform::GOG,
            "discord" => Platform::DISCORD,
            "all" => Platform::ALL,
            other => bail!("Unknown platform: {other}"),
        };
        Ok(platform)
    }
}

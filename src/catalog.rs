//! Known downloadable-content identifiers.
//!
//! The editing pipeline treats items as opaque `u32` values. This catalogue
//! names the ones the game is known to use, so callers and the command line
//! can refer to them by name.

use std::fmt;
use std::str::FromStr;

/// A known downloadable-content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Dlc {
    /// The Anarchist.
    TheAnarchist,
    /// Sunken Treasures.
    S1SunkenTreasures,
    /// Botanica.
    S1Botanica,
    /// The Passage.
    S1ThePassage,
    /// Seat of Power.
    S2SeatOfPower,
    /// Bright Harvest.
    S2BrightHarvest,
    /// Land of Lions.
    S2LandOfLions,
    /// Docklands.
    S3Docklands,
    /// Tourist Season.
    S3TouristSeason,
    /// The High Life.
    S3HighLife,
    /// Seeds of Change.
    S4SeedsOfChange,
    /// Empire of the Skies.
    S4EmpireOfTheSkies,
    /// New World Rising.
    S4NewWorldRising,
}

impl Dlc {
    /// Every known item, in release order.
    pub const ALL: [Dlc; 13] = [
        Dlc::TheAnarchist,
        Dlc::S1SunkenTreasures,
        Dlc::S1Botanica,
        Dlc::S1ThePassage,
        Dlc::S2SeatOfPower,
        Dlc::S2BrightHarvest,
        Dlc::S2LandOfLions,
        Dlc::S3Docklands,
        Dlc::S3TouristSeason,
        Dlc::S3HighLife,
        Dlc::S4SeedsOfChange,
        Dlc::S4EmpireOfTheSkies,
        Dlc::S4NewWorldRising,
    ];

    /// Returns the item value stored in the save.
    pub const fn value(self) -> u32 {
        match self {
            Dlc::TheAnarchist => 0xAA8F_3E00,
            Dlc::S1SunkenTreasures => 0xB841_0600,
            Dlc::S1Botanica => 0xB941_0600,
            Dlc::S1ThePassage => 0xBA41_0600,
            Dlc::S2SeatOfPower => 0xCB41_0600,
            Dlc::S2BrightHarvest => 0xD641_0600,
            Dlc::S2LandOfLions => 0xD741_0600,
            Dlc::S3Docklands => 0xE341_0600,
            Dlc::S3TouristSeason => 0xE441_0600,
            Dlc::S3HighLife => 0xE541_0600,
            Dlc::S4SeedsOfChange => 0x8161_0000,
            Dlc::S4EmpireOfTheSkies => 0x8261_0000,
            Dlc::S4NewWorldRising => 0x8361_0000,
        }
    }

    /// Returns the catalogue name, e.g. `S3_HIGH_LIFE`.
    pub const fn name(self) -> &'static str {
        match self {
            Dlc::TheAnarchist => "THE_ANARCHIST",
            Dlc::S1SunkenTreasures => "S1_SUNKEN_TREASURES",
            Dlc::S1Botanica => "S1_BOTANICA",
            Dlc::S1ThePassage => "S1_THE_PASSAGE",
            Dlc::S2SeatOfPower => "S2_SEAT_OF_POWER",
            Dlc::S2BrightHarvest => "S2_BRIGHT_HARVEST",
            Dlc::S2LandOfLions => "S2_LAND_OF_LIONS",
            Dlc::S3Docklands => "S3_DOCKLANDS",
            Dlc::S3TouristSeason => "S3_TOURIST_SEASON",
            Dlc::S3HighLife => "S3_HIGH_LIFE",
            Dlc::S4SeedsOfChange => "S4_SEEDS_OF_CHANGE",
            Dlc::S4EmpireOfTheSkies => "S4_EMPIRE_OF_THE_SKIES",
            Dlc::S4NewWorldRising => "S4_NEW_WORLD_RISING",
        }
    }

    /// Looks up an item by value.
    pub fn from_value(value: u64) -> Option<Dlc> {
        Self::ALL
            .into_iter()
            .find(|dlc| u64::from(dlc.value()) == value)
    }

    /// Looks up an item by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Dlc> {
        Self::ALL
            .into_iter()
            .find(|dlc| dlc.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Dlc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Dlc> for u32 {
    fn from(dlc: Dlc) -> u32 {
        dlc.value()
    }
}

/// An item argument that is neither a catalogue name nor a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item '{0}': expected a catalogue name or a numeric id")]
pub struct UnknownItem(pub String);

impl FromStr for Dlc {
    type Err = UnknownItem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dlc::from_name(s)
            .or_else(|| parse_number(s).and_then(|v| Dlc::from_value(u64::from(v))))
            .ok_or_else(|| UnknownItem(s.to_string()))
    }
}

/// Parses an item given by catalogue name, decimal value or `0x` hex value.
///
/// Numbers need not be in the catalogue.
pub fn parse_item(s: &str) -> Result<u32, UnknownItem> {
    Dlc::from_name(s)
        .map(Dlc::value)
        .or_else(|| parse_number(s))
        .ok_or_else(|| UnknownItem(s.to_string()))
}

fn parse_number(s: &str) -> Option<u32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => s.replace('_', "").parse().ok(),
    }
}

/// Returns the catalogue name for `value`, or its hex form.
pub fn describe(value: u64) -> String {
    match Dlc::from_value(value) {
        Some(dlc) => dlc.name().to_string(),
        None => format!("{:#x}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_match_decimal_ids() {
        assert_eq!(Dlc::TheAnarchist.value(), 2_861_514_240);
        assert_eq!(Dlc::S1SunkenTreasures.value(), 3_091_269_120);
        assert_eq!(Dlc::S2SeatOfPower.value(), 3_410_036_224);
        assert_eq!(Dlc::S3HighLife.value(), 3_846_243_840);
        assert_eq!(Dlc::S4SeedsOfChange.value(), 2_170_617_856);
        assert_eq!(Dlc::S4NewWorldRising.value(), 2_204_172_288);
    }

    #[test]
    fn test_values_are_unique() {
        let mut values: Vec<u32> = Dlc::ALL.iter().map(|d| d.value()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), Dlc::ALL.len());
    }

    #[test]
    fn test_name_roundtrip() {
        for dlc in Dlc::ALL {
            assert_eq!(Dlc::from_name(dlc.name()), Some(dlc));
            assert_eq!(Dlc::from_value(u64::from(dlc.value())), Some(dlc));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("s3_high_life".parse::<Dlc>().unwrap(), Dlc::S3HighLife);
        assert_eq!("0x83610000".parse::<Dlc>().unwrap(), Dlc::S4NewWorldRising);
        assert_eq!("2861514240".parse::<Dlc>().unwrap(), Dlc::TheAnarchist);
        assert!("0x1234".parse::<Dlc>().is_err());
        assert!("HIGH_LIFE".parse::<Dlc>().is_err());
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("S1_BOTANICA").unwrap(), 0xB941_0600);
        assert_eq!(parse_item("0x1234").unwrap(), 0x1234);
        assert_eq!(parse_item("42").unwrap(), 42);
        assert_eq!(parse_item("0xE541_0600").unwrap(), 0xE541_0600);
        let err = parse_item("botanica").unwrap_err();
        assert!(err.to_string().contains("botanica"));
        assert!(parse_item("0x1_0000_0000").is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(0xE541_0600), "S3_HIGH_LIFE");
        assert_eq!(describe(0x10), "0x10");
        assert_eq!(Dlc::S2LandOfLions.to_string(), "S2_LAND_OF_LIONS");
    }
}

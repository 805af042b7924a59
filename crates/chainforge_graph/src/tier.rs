// SPDX-License-Identifier: MIT OR Apache-2.0
//! Power tier classification for production nodes.

use serde::{Deserialize, Serialize};

/// Voltage tier of a machine, ordered from lowest to highest.
///
/// Each tier carries a fixed ordinal (1..=11) from which its throughput in
/// EU/t is derived. Ordering is by ordinal only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tier {
    /// Ultra low voltage
    Ulv,
    /// Low voltage
    Lv,
    /// Medium voltage
    Mv,
    /// High voltage
    Hv,
    /// Extreme voltage
    Ev,
    /// Insane voltage
    Iv,
    /// Ludicrous voltage
    Luv,
    /// ZPM voltage
    Zpm,
    /// Ultimate voltage
    Uv,
    /// Highly ultimate voltage
    Uhv,
    /// Extremely ultimate voltage
    Uev,
}

impl Tier {
    /// All tiers in ascending ordinal order.
    pub const ALL: [Tier; 11] = [
        Tier::Ulv,
        Tier::Lv,
        Tier::Mv,
        Tier::Hv,
        Tier::Ev,
        Tier::Iv,
        Tier::Luv,
        Tier::Zpm,
        Tier::Uv,
        Tier::Uhv,
        Tier::Uev,
    ];

    /// Ordinal of this tier, 1 for ULV through 11 for UEV.
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }

    /// Throughput of this tier in EU/t: `2^(2n + 1)` for ordinal `n`.
    pub fn eu_per_tick(self) -> u32 {
        1u32 << (2 * u32::from(self.ordinal()) + 1)
    }

    /// Canonical short name ("ULV", "LV", ...).
    pub fn name(self) -> &'static str {
        match self {
            Tier::Ulv => "ULV",
            Tier::Lv => "LV",
            Tier::Mv => "MV",
            Tier::Hv => "HV",
            Tier::Ev => "EV",
            Tier::Iv => "IV",
            Tier::Luv => "LuV",
            Tier::Zpm => "ZPM",
            Tier::Uv => "UV",
            Tier::Uhv => "UHV",
            Tier::Uev => "UEV",
        }
    }

    /// Lowest tier whose throughput strictly exceeds `eu_per_tick`.
    ///
    /// Returns `None` when the value is at or above the top tier's
    /// throughput; callers treat that as "unclassified".
    pub fn from_throughput(eu_per_tick: u32) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| eu_per_tick < tier.eu_per_tick())
    }

    /// Tier with the given ordinal, or `None` if no tier matches.
    pub fn from_ordinal(ordinal: u8) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.ordinal() == ordinal)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eu_per_tick_matches_ordinal_formula() {
        for tier in Tier::ALL {
            let n = u32::from(tier.ordinal());
            assert_eq!(tier.eu_per_tick(), 2u32.pow(2 * n + 1));
        }
        assert_eq!(Tier::Ulv.eu_per_tick(), 8);
        assert_eq!(Tier::Lv.eu_per_tick(), 32);
        assert_eq!(Tier::Uev.eu_per_tick(), 8_388_608);
    }

    #[test]
    fn test_eu_per_tick_strictly_increasing() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0].eu_per_tick() < pair[1].eu_per_tick());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_from_ordinal_round_trips() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_ordinal(tier.ordinal()), Some(tier));
        }
        assert_eq!(Tier::from_ordinal(0), None);
        assert_eq!(Tier::from_ordinal(12), None);
    }

    #[test]
    fn test_from_throughput_picks_lowest_exceeding_tier() {
        assert_eq!(Tier::from_throughput(0), Some(Tier::Ulv));
        assert_eq!(Tier::from_throughput(7), Some(Tier::Ulv));
        // Exactly ULV's throughput is no longer ULV-classifiable.
        assert_eq!(Tier::from_throughput(8), Some(Tier::Lv));
        assert_eq!(Tier::from_throughput(33), Some(Tier::Mv));
        for tier in Tier::ALL {
            let classified = Tier::from_throughput(tier.eu_per_tick() - 1).unwrap();
            assert_eq!(classified, tier);
            for lower in Tier::ALL.into_iter().filter(|t| *t < classified) {
                assert!(lower.eu_per_tick() <= tier.eu_per_tick() - 1);
            }
        }
    }

    #[test]
    fn test_from_throughput_unclassified_above_top_tier() {
        assert_eq!(Tier::from_throughput(Tier::Uev.eu_per_tick()), None);
        assert_eq!(Tier::from_throughput(u32::MAX), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Tier::Ulv.to_string(), "ULV");
        assert_eq!(Tier::Luv.to_string(), "LuV");
    }
}

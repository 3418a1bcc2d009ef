//! Unit power by rarity and level.
//!
//! Power doubles per level up to level 7, then steps by the table below.
//! Every column is strictly ordered by rarity and every row strictly
//! increases with level; sorting and badges rely on both.

use crate::unit::{Rarity, MAX_UNIT_LEVEL, MIN_UNIT_LEVEL};

const COMMON: [u32; 10] = [100, 200, 400, 800, 1600, 3200, 6400, 9600, 19200, 38400];
const RARE: [u32; 10] = [120, 240, 480, 960, 1920, 3840, 7680, 11520, 23040, 46080];
const EPIC: [u32; 10] = [140, 280, 560, 1120, 2240, 4480, 8960, 13440, 26880, 53760];
const LEGENDARY: [u32; 10] = [160, 320, 640, 1280, 2560, 5120, 10240, 20480, 30720, 61440];

const fn table(rarity: Rarity) -> &'static [u32; 10] {
    match rarity {
        Rarity::Common => &COMMON,
        Rarity::Rare => &RARE,
        Rarity::Epic => &EPIC,
        Rarity::Legendary => &LEGENDARY,
    }
}

/// Power of a unit with the given rarity and level.
///
/// Levels outside 1..=10 are clamped.
///
/// # Example
///
/// ```
/// use planner_core::power::calculate_unit_power;
/// use planner_core::unit::Rarity;
///
/// assert_eq!(calculate_unit_power(Rarity::Common, 1), 100);
/// assert_eq!(calculate_unit_power(Rarity::Legendary, 10), 61440);
/// ```
#[must_use]
pub fn calculate_unit_power(rarity: Rarity, level: u8) -> u32 {
    let level = level.clamp(MIN_UNIT_LEVEL, MAX_UNIT_LEVEL);
    table(rarity)[usize::from(level - MIN_UNIT_LEVEL)]
}

/// Format a number with a space as thousands separator.
///
/// `2201600` becomes `"2 201 600"`.
#[must_use]
pub fn format_power(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_monotonic_for_each_rarity() {
        for rarity in Rarity::ALL {
            for level in MIN_UNIT_LEVEL..MAX_UNIT_LEVEL {
                assert!(
                    calculate_unit_power(rarity, level) < calculate_unit_power(rarity, level + 1),
                    "{rarity} level {level}"
                );
            }
        }
    }

    #[test]
    fn test_rarity_ordered_at_each_level() {
        for level in MIN_UNIT_LEVEL..=MAX_UNIT_LEVEL {
            for pair in Rarity::ALL.windows(2) {
                assert!(
                    calculate_unit_power(pair[0], level) < calculate_unit_power(pair[1], level),
                    "{} vs {} at level {level}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(calculate_unit_power(Rarity::Rare, 0), 120);
        assert_eq!(calculate_unit_power(Rarity::Rare, 99), 46080);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(calculate_unit_power(Rarity::Common, 5), 1600);
        assert_eq!(calculate_unit_power(Rarity::Epic, 8), 13440);
        assert_eq!(calculate_unit_power(Rarity::Legendary, 9), 30720);
    }

    #[test]
    fn test_format_power() {
        assert_eq!(format_power(0), "0");
        assert_eq!(format_power(999), "999");
        assert_eq!(format_power(1000), "1 000");
        assert_eq!(format_power(61440), "61 440");
        assert_eq!(format_power(2_201_600), "2 201 600");
    }
}

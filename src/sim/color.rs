//! Ring colors and the composition rule
//!
//! Two half rings snap into a full ring whose color is the mix of the
//! members' primary colors. Only the three primary pairs mix; anything else
//! falls back to [`RingColor::Transparent`], which captures nothing.

use serde::{Deserialize, Serialize};

/// Closed color palette shared by rings and spirits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RingColor {
    Red,
    Yellow,
    Blue,
    Transparent,
    Orange,
    Green,
    Purple,
}

impl RingColor {
    /// The four colors half rings cycle through at spawn time
    pub const PRIMARIES: [RingColor; 4] = [
        RingColor::Red,
        RingColor::Yellow,
        RingColor::Blue,
        RingColor::Transparent,
    ];

    /// Mix two colors. Symmetric, total, no failure modes:
    /// Transparent is the identity, equal colors are idempotent, the three
    /// primary pairs produce their secondary, everything else is Transparent.
    pub fn combine(self, other: RingColor) -> RingColor {
        use RingColor::*;
        match (self, other) {
            (Transparent, c) | (c, Transparent) => c,
            (a, b) if a == b => a,
            (Red, Yellow) | (Yellow, Red) => Orange,
            (Red, Blue) | (Blue, Red) => Purple,
            (Yellow, Blue) | (Blue, Yellow) => Green,
            _ => Transparent,
        }
    }

    /// Display RGB for the presentation layer (explosion tint, haptic LEDs)
    pub fn display_rgb(self) -> [f32; 3] {
        use RingColor::*;
        match self {
            Red => [1.0, 0.0, 0.0],
            Yellow => [1.0, 1.0, 0.0],
            Blue => [0.0, 0.0, 1.0],
            Orange => [1.0, 0.5, 0.0],
            Green => [0.0, 1.0, 0.0],
            Purple => [1.0, 0.0, 1.0],
            Transparent => [1.0, 1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RingColor::*;

    const ALL: [RingColor; 7] = [Red, Yellow, Blue, Transparent, Orange, Green, Purple];

    #[test]
    fn test_primary_mixes() {
        assert_eq!(Red.combine(Yellow), Orange);
        assert_eq!(Red.combine(Blue), Purple);
        assert_eq!(Yellow.combine(Blue), Green);
    }

    #[test]
    fn test_transparent_is_identity() {
        for c in ALL {
            assert_eq!(Transparent.combine(c), c);
            assert_eq!(c.combine(Transparent), c);
        }
    }

    #[test]
    fn test_equal_colors_idempotent() {
        for c in ALL {
            assert_eq!(c.combine(c), c);
        }
    }

    #[test]
    fn test_unlisted_combinations_fall_back() {
        assert_eq!(Red.combine(Green), Transparent);
        assert_eq!(Orange.combine(Purple), Transparent);
        assert_eq!(Green.combine(Blue), Transparent);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_color() -> impl Strategy<Value = RingColor> {
            prop::sample::select(ALL.to_vec())
        }

        proptest! {
            #[test]
            fn combine_is_symmetric(a in any_color(), b in any_color()) {
                prop_assert_eq!(a.combine(b), b.combine(a));
            }

            #[test]
            fn combine_is_closed(a in any_color(), b in any_color()) {
                prop_assert!(ALL.contains(&a.combine(b)));
            }
        }
    }
}

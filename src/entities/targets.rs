//! Output platform bitmask, as stored in `.yy`/`.yyp` files.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Set of output platforms.
///
/// Bit values match the authoring tool; they are not contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets(pub i64);

impl Targets {
    pub const NONE: Targets = Targets(0);
    pub const ALL: Targets = Targets(-1);

    pub const MACOS: Targets = Targets(2);
    pub const IOS: Targets = Targets(4);
    pub const ANDROID: Targets = Targets(8);
    pub const HTML5: Targets = Targets(32);
    pub const WINDOWS: Targets = Targets(64);
    pub const UBUNTU: Targets = Targets(128);
    pub const PS4: Targets = Targets(4_294_967_296);
    pub const GXGAMES: Targets = Targets(17_179_869_184);
    pub const TVOS: Targets = Targets(9_007_199_254_740_992);
    pub const SWITCH: Targets = Targets(144_115_188_075_855_872);
    pub const PS5: Targets = Targets(576_460_752_303_423_488);
    pub const XBOX: Targets = Targets(2_305_843_009_213_693_952);

    /// Every platform an included file can be copied to.
    pub const ALL_INCLUDED_FILE: Targets = Targets(
        Self::WINDOWS.0
            | Self::MACOS.0
            | Self::IOS.0
            | Self::ANDROID.0
            | Self::HTML5.0
            | Self::UBUNTU.0
            | Self::PS4.0
            | Self::PS5.0
            | Self::XBOX.0
            | Self::SWITCH.0
            | Self::TVOS.0
            | Self::GXGAMES.0,
    );

    pub fn contains(self, other: Targets) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Targets {
    type Output = Targets;

    fn bitor(self, rhs: Targets) -> Targets {
        Targets(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_ops() {
        let native = Targets::WINDOWS | Targets::XBOX;
        assert!(native.contains(Targets::WINDOWS));
        assert!(native.contains(Targets::XBOX));
        assert!(!native.contains(Targets::MACOS));
        assert!(Targets::ALL_INCLUDED_FILE.contains(native));
        assert!(Targets::ALL.contains(Targets::ALL_INCLUDED_FILE));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Targets::WINDOWS).unwrap(), "64");
        assert_eq!(serde_json::to_string(&Targets::ALL).unwrap(), "-1");
    }
}

//! Content flags for collision filtering.
//!
//! Every brush in the world carries a content set; capsule queries only
//! consider brushes whose contents intersect the query mask.

use serde::{Deserialize, Serialize};

/// Content flags describe what kind of volume a brush is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Empty space.
    pub const EMPTY: Self = Self(0);

    /// Solid world geometry - walls, floors, furniture bolted to the floor.
    pub const SOLID: Self = Self(1 << 0);

    /// Invisible wall that only blocks the player.
    pub const PLAYER_CLIP: Self = Self(1 << 1);

    /// Mask used by the player capsule.
    pub const MASK_PLAYER_SOLID: Self = Self(Self::SOLID.0 | Self::PLAYER_CLIP.0);

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_mask() {
        let mask = ContentFlags::MASK_PLAYER_SOLID;
        assert!(mask.intersects(ContentFlags::SOLID));
        assert!(mask.intersects(ContentFlags::PLAYER_CLIP));
        assert!(!mask.intersects(ContentFlags::EMPTY));
    }

    #[test]
    fn test_bitor_combines() {
        let combined = ContentFlags::SOLID | ContentFlags::PLAYER_CLIP;
        assert_eq!(combined, ContentFlags::MASK_PLAYER_SOLID);
        assert!(combined.intersects(ContentFlags::PLAYER_CLIP));
        assert!(!ContentFlags::EMPTY.intersects(combined));
    }
}

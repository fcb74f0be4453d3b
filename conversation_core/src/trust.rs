//! Trust tiers - how an NPC regards the player.

use serde::{Deserialize, Serialize};

use npc_registry::LOVER_RANK;

/// Natural-language summary of an NPC's disposition towards the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustTier {
    Stranger,
    Acquaintance,
    Friend,
    CloseFriend,
    Lover,
    Enemy,
}

impl TrustTier {
    pub fn label(&self) -> &'static str {
        match self {
            TrustTier::Stranger => "stranger",
            TrustTier::Acquaintance => "acquaintance",
            TrustTier::Friend => "friend",
            TrustTier::CloseFriend => "close friend",
            TrustTier::Lover => "lover",
            TrustTier::Enemy => "enemy",
        }
    }

    /// The label with its indefinite article, as used in sentences.
    pub fn with_article(&self) -> String {
        match self {
            TrustTier::Acquaintance | TrustTier::Enemy => format!("an {}", self.label()),
            _ => format!("a {}", self.label()),
        }
    }
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a relationship rank and the number of logged past exchanges to a tier.
///
/// The exchange count only matters for rank 0, where it distinguishes
/// strangers (none), acquaintances (1-9), friends (10-49) and close friends (50+).
pub fn trust_tier(relationship_rank: i32, prior_exchanges: usize) -> TrustTier {
    match relationship_rank {
        0 => match prior_exchanges {
            0 => TrustTier::Stranger,
            1..=9 => TrustTier::Acquaintance,
            10..=49 => TrustTier::Friend,
            _ => TrustTier::CloseFriend,
        },
        LOVER_RANK => TrustTier::Lover,
        rank if rank > 0 => TrustTier::Friend,
        _ => TrustTier::Enemy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_zero_depends_on_history() {
        assert_eq!(trust_tier(0, 0), TrustTier::Stranger);
        assert_eq!(trust_tier(0, 1), TrustTier::Acquaintance);
        assert_eq!(trust_tier(0, 5), TrustTier::Acquaintance);
        assert_eq!(trust_tier(0, 9), TrustTier::Acquaintance);
        assert_eq!(trust_tier(0, 10), TrustTier::Friend);
        assert_eq!(trust_tier(0, 49), TrustTier::Friend);
        assert_eq!(trust_tier(0, 50), TrustTier::CloseFriend);
        assert_eq!(trust_tier(0, 500), TrustTier::CloseFriend);
    }

    #[test]
    fn test_rank_overrides_history() {
        for count in [0, 5, 10, 50] {
            assert_eq!(trust_tier(1, count), TrustTier::Friend);
            assert_eq!(trust_tier(2, count), TrustTier::Friend);
            assert_eq!(trust_tier(3, count), TrustTier::Friend);
            assert_eq!(trust_tier(4, count), TrustTier::Lover);
            assert_eq!(trust_tier(-1, count), TrustTier::Enemy);
            assert_eq!(trust_tier(-4, count), TrustTier::Enemy);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(TrustTier::CloseFriend.to_string(), "close friend");
        assert_eq!(TrustTier::Stranger.with_article(), "a stranger");
        assert_eq!(TrustTier::Acquaintance.with_article(), "an acquaintance");
        assert_eq!(TrustTier::Enemy.with_article(), "an enemy");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Ambassador {
    pub id: String,
    pub name: String,
    pub handle: String,
    pub country: String,
    // invites and score are slated for removal from the ambassador table
    pub invites: i32,
    pub score: i32,
    pub referral_code: String,

    /// Abbreviated wallet address, only carried by fixture rows
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,

    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_multiplier: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ambassador with its position on the leaderboard.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RankedAmbassador {
    pub rank: usize,
    #[serde(flatten)]
    pub ambassador: Ambassador,
}

impl RankedAmbassador {
    /// Ranks by score descending. Ties keep their incoming order.
    pub fn rank_all(mut ambassadors: Vec<Ambassador>) -> Vec<RankedAmbassador> {
        ambassadors.sort_by(|a, b| b.score.cmp(&a.score));
        ambassadors
            .into_iter()
            .enumerate()
            .map(|(idx, ambassador)| RankedAmbassador {
                rank: idx + 1,
                ambassador,
            })
            .collect()
    }

    pub fn is_top_three(&self) -> bool {
        self.rank <= 3
    }
}

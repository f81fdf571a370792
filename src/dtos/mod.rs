pub mod leaderboarddtos;
pub mod referraldtos;

pub use leaderboarddtos::*;
pub use referraldtos::*;

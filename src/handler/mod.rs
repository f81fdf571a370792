pub mod leaderboard;
pub mod referral;

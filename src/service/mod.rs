pub mod airdrop;
pub mod error;
pub mod export;
pub mod leaderboard;
pub mod mock_data;
pub mod referral;

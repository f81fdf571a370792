pub mod ambassadormodel;
pub mod referralmodel;

pub mod instagram;
pub mod tweets;

pub mod review;
pub mod taxonomy;
pub mod title;
pub mod user;

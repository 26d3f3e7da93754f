pub mod drink;
pub mod profile;
pub mod review;
pub mod session;
pub mod user;

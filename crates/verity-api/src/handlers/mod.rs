pub mod health;
pub mod history;
pub mod home;
pub mod predict;
pub mod stats;

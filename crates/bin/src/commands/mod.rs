pub mod ask;
pub mod health;
pub mod local;
pub mod serve;

pub mod aggregate;
pub mod ping;
pub mod serve;
pub mod setup;
pub mod ui;

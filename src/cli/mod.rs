pub mod assets;
pub mod assign;
pub mod funds;
pub mod import;
pub mod init_prices;
pub mod setup;
pub mod ui;

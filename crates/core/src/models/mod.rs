pub mod gift;
pub mod settings;
pub mod transfer;

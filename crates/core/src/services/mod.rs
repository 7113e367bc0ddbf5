pub mod gift_service;
pub mod transfer_service;

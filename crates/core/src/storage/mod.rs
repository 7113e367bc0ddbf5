pub mod cloudflare_kv;
pub mod config;
pub mod file;
pub mod memory;
pub mod redis_kv;
pub mod traits;
pub mod vercel_kv;

/// Fixed keys the wishlist is stored under.
pub mod keys {
    pub const GIFTS_KEY: &str = "christmas-list-gifts";
    pub const SETTINGS_KEY: &str = "christmas-list-settings";
}

pub mod api;
pub mod autocomplete;
pub mod clock;
pub mod config;
pub mod feed;
pub mod game;
pub mod http_client;
pub mod image_ref;
pub mod persist;
pub mod share;
pub mod state;

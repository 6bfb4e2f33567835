pub mod config;
pub mod direction;
pub mod events;
pub mod message;
pub mod request;

pub mod transport;
pub mod web_push;

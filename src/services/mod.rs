pub mod broadcast_service;
pub mod push;
pub mod subscription_service;

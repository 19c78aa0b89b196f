pub mod attachment;
pub mod audit;
pub mod auth;
pub mod case;
pub mod catalog;
pub mod intake;
pub mod lifecycle;
pub mod message;
pub mod share;
pub mod user;

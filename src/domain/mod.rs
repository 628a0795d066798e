//! Domain layer: value objects, entities and the ports the application layer
//! depends on.

pub mod account;
pub mod favorite;
pub mod payment;
pub mod ports;

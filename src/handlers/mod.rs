pub mod health;
pub mod prices;

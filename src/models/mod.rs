pub mod observation;
pub mod prices;

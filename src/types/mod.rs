pub mod amazon;
pub mod marketplace;
pub mod noon;

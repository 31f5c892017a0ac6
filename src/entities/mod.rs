pub mod field;
pub mod pallet;
pub mod position;
pub mod rack;
pub mod shelf;
pub mod vault;
pub mod warehouse;

pub use position::Position;

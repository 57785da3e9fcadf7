pub mod category;
pub mod movement;
pub mod product;

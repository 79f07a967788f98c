pub mod duration;
pub mod mutate;
pub mod traversal;

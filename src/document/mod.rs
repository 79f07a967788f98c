pub mod node;
pub mod tree;
pub mod xml;

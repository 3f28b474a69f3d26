pub mod chess;
pub use chess::*;

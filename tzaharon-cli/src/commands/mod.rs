pub mod board;
pub mod child;
pub mod reset;
pub mod serve;
pub mod status;

pub mod error;
pub mod positions;
pub mod satellites;

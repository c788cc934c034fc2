pub mod amm;
pub mod amount;
pub mod arguments;
pub mod fee;
pub mod pool_service;
mod run;
pub mod tokens;
pub mod traits;

pub use run::{run, start};

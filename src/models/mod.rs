pub use account::*;
pub use order::*;
pub use symbol_rules::*;

pub mod account;
pub mod order;
pub mod symbol_rules;

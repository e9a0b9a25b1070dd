pub mod value;
pub use value::*;

pub mod scope;
pub use scope::*;

pub mod aggregate;
pub use aggregate::*;

pub mod window;
pub use window::*;

pub mod expr_builder;
pub use expr_builder::*;

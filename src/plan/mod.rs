pub mod literal;
pub use literal::*;

pub mod plan_expr;
pub use plan_expr::*;

pub mod clause;
pub use clause::*;

pub mod logical_plan;
pub use logical_plan::*;

pub mod assembler;
pub use assembler::*;

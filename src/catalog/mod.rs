pub mod sql_type;
pub use sql_type::*;

pub mod table_schema;
pub use table_schema::*;

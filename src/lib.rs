pub mod demo;
pub mod expression;
pub mod sql;
pub mod value;

//! Business logic, one module per aggregate

pub mod catalogue;
pub mod category;
pub mod images;
pub mod product;
pub mod storage;

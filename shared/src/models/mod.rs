//! Entity models shared between the server and its clients

pub mod catalogue;
pub mod category;
pub mod product;

pub use catalogue::{Catalogue, CatalogueCreate, CatalogueUpdate, ContactMethod};
pub use category::{Category, CategoryCreate};
pub use product::{
    Currency, Product, ProductCreate, ProductImage, ProductStatus, ProductUpdate,
};

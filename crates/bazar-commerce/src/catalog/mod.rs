//! Catalog: products, categories, and brands.

mod brand;
mod category;
mod product;

pub use brand::Brand;
pub use category::{build_tree, slugify, Category, CategoryKind, CategoryNode};
pub use product::{Product, Rating};

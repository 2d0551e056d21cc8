//! Course Catalog
//!
//! Course content management: public listing and admin CRUD.

#![warn(missing_docs)]

pub mod service;

pub use service::{
    CourseCatalog, BasicCatalog, CatalogError, NewCourse, NewModule, NewLesson,
};

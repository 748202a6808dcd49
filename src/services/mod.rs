//! Request-level services shared by the HTTP handlers

pub mod code_generator;
pub mod create;
pub mod redirect;

pub use code_generator::CodeGenerator;
pub use create::{CreateHandler, CreateUrlRequest, UrlCreateResult};
pub use redirect::RedirectResolver;

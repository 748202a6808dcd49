pub mod create;
pub mod health;
pub mod redirect;

pub use create::CreateService;
pub use health::HealthService;
pub use redirect::{RedirectService, redirect_routes};

pub mod click;
pub mod health;
pub mod page;

pub use click::{ClickApi, click_routes};
pub use health::{HealthService, health_routes};
pub use page::{PageService, page_routes, render_page};

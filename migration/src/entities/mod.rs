pub mod link_click;

pub use link_click::Entity as LinkClickEntity;

pub mod menu_service;

pub use menu_service::{MenuNode, MenuService, MenuStore};

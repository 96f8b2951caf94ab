pub mod health;
pub mod settings;
pub mod tabs;

pub mod header;
pub mod host_screen;
pub mod modals;

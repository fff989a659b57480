pub mod cursors;
pub mod gateway;
pub mod hints;
pub mod manager;
pub mod placement;

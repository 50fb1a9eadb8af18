// Business-card reader: image → vision reply → contact fields → record store.

pub mod export;
pub mod extract;
pub mod handlers;
pub mod images;
pub mod models;
pub mod store;

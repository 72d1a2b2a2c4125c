pub mod collection;
pub mod document;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::create as collection_post;
pub use collection::delete as collection_delete;
pub use collection::list as collection_get;
pub use collection::update as collection_put;

pub use document::delete as document_delete;
pub use document::get as document_get;
pub use document::put as document_put;

// Insurance directory: generic CRUD lives in handlers::data, provider scoping here
pub mod provider;

pub use provider::delete as provider_delete;
pub use provider::get as provider_get;
pub use provider::post as provider_post;

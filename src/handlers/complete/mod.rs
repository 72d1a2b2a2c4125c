// Aggregate routes: a parent document with its child sections
pub mod company;
pub mod project;

pub use company::get as company_get;
pub use company::post as company_post;
pub use company::put as company_put;

pub use project::get as project_get;
pub use project::post as project_post;
pub use project::put as project_put;

// handlers/mod.rs - route handlers grouped by surface
//
// data      → generic CRUD mounted once per collection (/api/{route}[/:id])
// complete  → aggregate routes (/api/company-complete, /api/project-complete)
// insurance → provider-scoped policy routes (/api/insurance/provider)
pub mod complete;
pub mod data;
pub mod insurance;

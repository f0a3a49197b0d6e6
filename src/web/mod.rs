mod handlers;
mod routes;
mod static_page;

pub use routes::create_router;

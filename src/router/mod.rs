pub mod career_router;
pub mod quote_router;
pub mod site_router;

pub mod error;
pub mod mockapi;
pub mod traits;

pub use error::CatalogError;
pub use mockapi::MockApiClient;
pub use traits::CatalogService;

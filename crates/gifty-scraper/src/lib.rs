pub mod domains;
pub mod error;
pub mod extract;
pub mod fetch;
mod jsonld;
mod merchants;
pub mod normalize;
pub mod proxy;

pub use error::ScrapeError;
pub use extract::extract_product;
pub use fetch::{PageFetcher, PageHeaders};
pub use proxy::{build_proxy_request, ProxyProvider, ProxyRequest, ProxySettings};

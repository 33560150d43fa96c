pub mod animation;
pub mod components;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod notify;
pub mod page;
pub mod runtime;
pub mod storage;
pub mod timers;

pub use config::{AppConfig, EasingType, SiteProfile};
pub use error::{Error, Result};
pub use fixture::PageFixture;
pub use page::{Features, Page, PageEvent};
pub use runtime::{PageHandle, PageRuntime};

// src/config/mod.rs
pub mod cms;
pub mod site;

pub use cms::CmsConfig;
pub use site::{env_flag, SiteConfig};

//! HTTP bindings to the blog server, and the state a UI keeps between calls

mod article;
pub use article::{ArticleView, Draft, EditSession, SaveRequest, ViewState};

mod client;
pub use client::Client;

mod discussion;
pub use discussion::Discussion;

mod error;
pub use error::ViewError;

mod outline;
pub use outline::{Heading, Outline, ScrollSpy, ACTIVE_THRESHOLD_PX, INDENT_PX};

pub mod api {
    pub use blog_api::*;
}

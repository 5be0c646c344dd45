//! Applications: the shared helper and the synchronous and asynchronous runners.

#[allow(clippy::module_inception)]
mod app_helper;
pub use app_helper::AppHelper;
pub use app_helper::AppState;
pub use app_helper::Runner;

mod application;
pub use application::Application;
pub use application::Main;

mod async_application;
pub use async_application::AsyncApplication;
pub use async_application::AsyncMain;

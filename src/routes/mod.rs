pub mod convert;
pub mod health;
pub mod status;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::services::scheduler::SharedScheduler;

pub fn create_router(scheduler: SharedScheduler, config: &Config) -> Router {
    Router::new()
        .merge(health::router(config.ytdlp_bin.clone()))
        .merge(convert::router(scheduler.clone()))
        .merge(status::router(scheduler))
        .nest_service("/download", ServeDir::new(&config.downloads_dir))
}

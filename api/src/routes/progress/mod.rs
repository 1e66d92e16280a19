mod route;

pub use route::stream_progress;

mod route;

pub use route::record_feedback;

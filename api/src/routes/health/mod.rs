mod route;

pub use route::healthz;

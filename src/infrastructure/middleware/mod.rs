// ViewerContext Middleware - Separates authentication plumbing from comment logic

pub mod viewer_context_extractor;
pub mod viewer_context_middleware;

pub use viewer_context_extractor::Vc;
pub use viewer_context_middleware::*;

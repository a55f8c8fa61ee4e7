/// OpenAPI documentation generation.
pub mod documentation;
/// Form mirror and its write-through persistence.
pub mod form_service;
/// Health check service.
pub mod health_service;
/// Settlement submission workflow.
pub mod settlement_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Ordered checks producing a settlement request.
pub mod validator;

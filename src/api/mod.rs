// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embed;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use embed::{embed_handler, EmbedRequest, EmbedResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::HealthResponse;
pub use http_server::{create_app, serve_with_shutdown, start_server, AppState};

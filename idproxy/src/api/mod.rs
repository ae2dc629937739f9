//! REST API served under `/api`.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: request and response types, documented with `utoipa`
//!
//! | Method   | Path                  | Handler                                    |
//! |----------|-----------------------|--------------------------------------------|
//! | `POST`   | `/api/account-status` | [`handlers::account_status::check_account_status`] |
//! | `GET`    | `/api/recent-queries` | [`handlers::recent_queries::list_recent_queries`]  |
//! | `DELETE` | `/api/recent-queries` | [`handlers::recent_queries::clear_recent_queries`] |

pub mod handlers;
pub mod models;

//! Integration test modules

mod api_client_test;
mod auth_shell_test;
mod review_test;
mod surveys_test;

//! HTTP integration tests driving the router over the in-memory store.

mod helpers;

mod access_test;
mod department_test;
mod role_change_test;
mod sync_test;

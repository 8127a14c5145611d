pub mod common;

mod job_repository_tests;
mod profile_repository_tests;

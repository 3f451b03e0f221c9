// Services module for course management logic
pub mod build_orchestrator;
pub mod course_repository;
pub mod process_runner;
pub mod scaffold;

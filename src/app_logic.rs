/*
 * This module provides the application logic layer: the selection
 * synchronizer that keeps the file tree and the ordered merge list in step,
 * the click helpers that turn raw input into gestures, and
 * `FileManagerLogic`, which adapts toolkit-neutral UI events onto them.
 * Unit tests for `FileManagerLogic` are in `handler_tests.rs`.
 */
pub mod activation;
pub mod handler;
pub mod synchronizer;
pub mod ui_constants;
pub mod ui_types;


pub use handler::FileManagerLogic;

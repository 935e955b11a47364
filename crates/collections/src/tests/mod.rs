//! Cross-module behavior tests for the builder lifecycle.

mod lifecycle;

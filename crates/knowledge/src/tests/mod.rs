//! Cross-module tests for the knowledge base.

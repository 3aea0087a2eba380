//! Integration tests for querygen live in `tests/`

//! Lorn DI 端到端集成测试，测试位于 `tests/` 目录

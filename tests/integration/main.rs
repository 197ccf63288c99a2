// 統合テストのエントリポイント

#[path = "../fixtures/mod.rs"]
mod fixtures;

mod test_fan_out;
mod test_single_consumer;

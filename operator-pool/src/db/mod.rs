//! データベースアクセス層
//!
//! オペレーターレコードの永続化

/// オペレーターテーブル操作（SQLite）
pub mod operators;

/// インメモリストア
pub mod memory;

/// データベースマイグレーション
pub mod migrations;

/// Repository traitパターン（ストアの差し替え）
pub mod traits;

pub use memory::MemoryOperatorStore;
pub use operators::SqliteOperatorStore;
pub use traits::OperatorStore;

//! 管理员账号初始化
//!
//! ```text
//! seeder::seed_admin (校验 + 哈希 + 跳过已存在账号)
//!     ↓
//! AdminRepository (MongoAdminRepository / InMemoryAdminRepository)
//! ```

pub mod mongo;
pub mod password;
pub mod repository;
pub mod seeder;

pub use mongo::MongoAdminRepository;
pub use password::{hash_password, verify_password};
pub use repository::{AdminRepository, InMemoryAdminRepository};
pub use seeder::{seed_admin, SeedOutcome, MIN_PASSWORD_LEN};

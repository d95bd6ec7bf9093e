pub mod lazy;
pub mod postgres;
pub mod redis;

pub use lazy::LazyUserRepository;
pub use postgres::PostgresUserRepository;
pub use redis::RedisUserRepository;

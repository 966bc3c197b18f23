pub use shared::util::now_millis;

pub mod cache;
pub mod db;
pub mod mail;
pub mod password;
pub mod storage;

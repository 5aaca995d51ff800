pub mod catalog;
pub mod manifest;
pub mod serve;
pub mod streams;

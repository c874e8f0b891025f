// Core types shared by every module

pub mod strong_types;

pub use strong_types::{CommentId, Timestamp, UserId};

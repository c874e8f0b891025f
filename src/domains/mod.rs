// Domain-Driven Organization - owner entities organized by domain

pub mod sentinels;

//! Core types and storage traits for the mailing list.
//!
//! This crate contains no I/O. Storage backends live in the `mailinglist`
//! crate and implement the traits defined in [`storage`].

pub mod storage;
pub mod subscription;

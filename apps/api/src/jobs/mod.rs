//! Minimal job-posting intake so postings exist to rank against.

pub mod handlers;

//! Whole-document JSON storage shared by the bazaar front ends.

pub mod documents;
pub mod persistence;

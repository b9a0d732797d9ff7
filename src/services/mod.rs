// src/services/mod.rs

//! Per-line services: parsing captured lines and classifying seller codes.

pub mod classifier;
pub mod parser;

pub use classifier::{
    CodeClassifier, LegacyClassifier, StandardClassifier, classifier_for, tokenize,
};
pub use parser::{LineFailure, ParsedBatch, parse_line, parse_lines};

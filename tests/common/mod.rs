//! Common test utilities for diseasemap.
//!
//! Shared float assertions, image helpers and layer fixtures for the
//! integration tests.
#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
pub mod layers;

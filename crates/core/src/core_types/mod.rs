//! Core types and utilities

pub mod vector;

pub use vector::Vector3D;

//! [`Value`](crate::Value) implementations for std types.

mod collections;
mod option;
mod scalar;

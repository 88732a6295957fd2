//! A serialization host for [`lz_reflect`] values.
//!
//! # Overview
//!
//! - [`ValueSerializer`]: serializes one type-erased value into an [`Output`].
//!   Serializers are immutable and shared as [`SharedSerializer`].
//! - [`ContextualSerializer`]: the optional capability of specializing a
//!   serializer for the property it is bound to, reached through
//!   [`ValueSerializer::as_contextual`].
//! - [`SerializerProvider`]: per-pass context handed to every serializer; finds
//!   serializers for runtime types, contextualizes them, resolves
//!   [`Deferred`](lz_reflect::Deferred) values and writes nulls.
//! - [`Module`]: installs [`Serializers`] (type-based lookups),
//!   [`SerializerModifier`]s (rewriting default serializers) and
//!   [`PropertyFilter`]s into an [`ObjectMapperBuilder`].
//! - [`ObjectMapper`]: builds one root serializer per registered type and
//!   drives serialization into any `serde::Serializer`.
//!
//! # Serializer resolution
//!
//! For each registered type, [`ObjectMapperBuilder::build`]:
//!
//! 1. asks every [`Serializers`] (last registered first); the first `Some` wins;
//! 2. otherwise creates the default serializer for the type's kind and passes
//!    collection and map serializers through every [`SerializerModifier`];
//! 3. builds struct serializers last, contextualizing the serializer of each
//!    field against that field's [`FieldInfo`](lz_reflect::info::FieldInfo).
//!
//! Root values are serialized with serializers contextualized without a
//! property.
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod error;
mod mapper;
mod module;
mod output;
mod provider;
mod serializer;
mod type_ser;

pub mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use config::{Inclusion, SerializeConfig};
pub use error::SerializeError;
pub use mapper::{ObjectMapper, ObjectMapperBuilder, SerializeDriver};
pub use module::{Module, PropertyFilter, SerializerModifier, Serializers, SetupContext};
pub use output::{Bound, Output};
pub use provider::SerializerProvider;
pub use serializer::{ContextualSerializer, SharedSerializer, ValueSerializer};
pub use type_ser::{TypeIdStyle, TypeInclusion, TypeSerializer};

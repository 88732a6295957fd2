#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use lz_orm as orm;
pub use lz_persist as persist;
pub use lz_reflect as reflect;
pub use lz_serde as serde;
pub use lz_utils as utils;

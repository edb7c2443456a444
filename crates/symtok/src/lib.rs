#![deny(rust_2018_idioms)]

#[doc(inline)]
pub use symtok_core::*;

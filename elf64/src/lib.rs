//! ELF64 analysis and rewriting library.
//!
//! Parses 64-bit ELF shared objects and executables into an owned in-memory
//! model ([`Elf64Binary`]), and builds tooling on top of that model:
//!
//! - [`parser`] — file → model, with section names resolved through the
//!   section-header string table.
//! - [`writer`] — model → file, reproducing the original layout including
//!   inter-section padding.
//! - [`aligner`] — rounds `PT_LOAD` sizes up to their `p_align` boundary.
//! - [`fragmentation`] — directory walker estimating page-fill waste of
//!   shared libraries at 4 KiB / 16 KiB / 64 KiB page sizes.
//! - [`comparator`] — structural diff of two parsed models.
//! - [`printer`] — readelf-style text dump.
//!
//! The model is plain owned data (`Vec`s of `Copy` header structs plus owned
//! section bytes), so it can be cloned, mutated, and written back freely.

pub mod aligner;
pub mod binary;
pub mod comparator;
pub mod error;
pub mod fragmentation;
pub mod output;
pub mod parser;
pub mod printer;
pub mod types;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use binary::{Elf64Binary, Elf64Ehdr, Elf64Phdr, Elf64Sc, Elf64Shdr};
pub use error::{Elf64Error, Elf64Result};
pub use parser::Elf64Parser;
pub use writer::Elf64Writer;

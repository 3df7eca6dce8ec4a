//! ELF64 file writer.
//!
//! Serializes an [`Elf64Binary`] back to disk in the layout the model was
//! parsed from: executable header, program headers, sections, section
//! headers. Inter-section padding is reconstructed from the recorded
//! section offsets, so an unmutated model writes back byte-identical to
//! its input. A model whose `PT_LOAD` sizes were rewritten by the aligner
//! differs only in the program-header region, because program headers are
//! a separate table from the sections.
//!
//! Write failures are fatal and leave partial output behind: this is a
//! batch tool, not a crash-safe editor.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::mem::size_of;
use std::path::Path;

use crate::binary::Elf64Binary;
use crate::error::{Elf64Error, Elf64Result};

/// ELF64 writer.
pub struct Elf64Writer;

impl Elf64Writer {
    /// Write the model to `path`.
    pub fn write_file(binary: &Elf64Binary, path: &Path) -> Elf64Result<()> {
        log::info!("writing ELF64 binary to {}", path.display());

        let file = File::create(path).map_err(|source| Elf64Error::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut out = BufWriter::new(file);

        Self::write_bytes(&mut out, record_bytes(&binary.ehdr))?;

        for phdr in &binary.phdrs {
            Self::write_bytes(&mut out, record_bytes(phdr))?;
        }

        Self::write_sections(&mut out, binary)?;

        for shdr in &binary.shdrs {
            Self::write_bytes(&mut out, record_bytes(shdr))?;
        }

        out.flush().map_err(|source| Elf64Error::Write { len: 0, source })?;
        Ok(())
    }

    /// Write sections 1..N with their trailing padding.
    ///
    /// Section 0's file range is the executable header and the program
    /// header table, which were already emitted, so it is skipped. NOBITS
    /// sections are skipped entirely: their bytes exist only in memory at
    /// runtime, and the following section starts at the same file offset.
    fn write_sections(out: &mut BufWriter<File>, binary: &Elf64Binary) -> Elf64Result<()> {
        let count = binary.sections.len();
        if count <= 1 {
            return Ok(());
        }

        for i in 1..count - 1 {
            let shdr = &binary.shdrs[i];
            if shdr.is_nobits() {
                continue;
            }

            let data = binary.sections[i].data.as_deref().unwrap_or(&[]);
            Self::write_bytes(out, data)?;

            let end = shdr.sh_offset + shdr.sh_size;
            let next_offset = binary.shdrs[i + 1].sh_offset;
            let padding = next_offset.checked_sub(end).ok_or_else(|| {
                Elf64Error::InvalidLayout {
                    detail: format!(
                        "section [{}] ends at {end:#x}, past the next section's offset \
                         {next_offset:#x}",
                        i
                    ),
                }
            })?;
            Self::write_padding(out, padding)?;
        }

        Self::write_last_section(out, binary)
    }

    /// The padding after the last section is computed against the section
    /// header table offset recorded in the executable header, so the
    /// table lands exactly where the header declares it.
    fn write_last_section(out: &mut BufWriter<File>, binary: &Elf64Binary) -> Elf64Result<()> {
        let i = binary.sections.len() - 1;
        let shdr = &binary.shdrs[i];

        let data = binary.sections[i].data.as_deref().unwrap_or(&[]);
        Self::write_bytes(out, data)?;

        let end = shdr.sh_offset + data.len() as u64;
        let e_shoff = binary.ehdr.e_shoff;
        let padding = e_shoff
            .checked_sub(end)
            .ok_or_else(|| Elf64Error::InvalidLayout {
                detail: format!(
                    "last section ends at {end:#x}, past the section header table offset \
                     {e_shoff:#x}"
                ),
            })?;
        Self::write_padding(out, padding)
    }

    fn write_bytes(out: &mut BufWriter<File>, data: &[u8]) -> Elf64Result<()> {
        out.write_all(data).map_err(|source| Elf64Error::Write {
            len: data.len() as u64,
            source,
        })
    }

    fn write_padding(out: &mut BufWriter<File>, len: u64) -> Elf64Result<()> {
        let zeros = vec![0u8; len as usize];
        Self::write_bytes(out, &zeros)
    }
}

/// View a header record as its on-disk bytes.
fn record_bytes<T: Copy>(record: &T) -> &[u8] {
    // SAFETY: only instantiated with the repr(C, packed) header records
    // from crate::binary; they have no padding bytes, so every byte of
    // the value is initialized.
    unsafe { std::slice::from_raw_parts((record as *const T).cast::<u8>(), size_of::<T>()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Elf64Parser;
    use crate::test_support::{sample_binary, sample_elf_bytes};
    use tempfile::NamedTempFile;

    #[test]
    fn unmutated_model_round_trips_byte_identical() {
        let input = sample_elf_bytes();
        let binary = sample_binary();

        let out = NamedTempFile::new().unwrap();
        Elf64Writer::write_file(&binary, out.path()).unwrap();

        let written = std::fs::read(out.path()).unwrap();
        assert_eq!(written, input);
    }

    #[test]
    fn nobits_section_contributes_no_file_bytes() {
        let binary = sample_binary();
        let out = NamedTempFile::new().unwrap();
        Elf64Writer::write_file(&binary, out.path()).unwrap();

        // The written file is exactly as long as the original layout says,
        // even though .bss claims 32 bytes of memory.
        let written = std::fs::read(out.path()).unwrap();
        assert_eq!(written.len() as u64, 472);

        // And the .bss header still records its full memory size.
        let reparsed = Elf64Parser::parse_file(out.path()).unwrap();
        let sh_size = reparsed.shdrs[2].sh_size;
        assert_eq!(sh_size, 32);
    }

    #[test]
    fn overlapping_section_layout_is_rejected() {
        let mut binary = sample_binary();
        // Pull the section header table offset before the last section's end.
        binary.ehdr.e_shoff = 100;

        let out = NamedTempFile::new().unwrap();
        match Elf64Writer::write_file(&binary, out.path()) {
            Err(Elf64Error::InvalidLayout { .. }) => {}
            other => panic!("expected InvalidLayout, got {other:?}"),
        }
    }

    #[test]
    fn model_without_sections_still_writes_headers() {
        let mut binary = sample_binary();
        binary.sections.truncate(1);
        binary.shdrs.truncate(1);
        binary.ehdr.e_shnum = 1;

        let out = NamedTempFile::new().unwrap();
        Elf64Writer::write_file(&binary, out.path()).unwrap();

        let written = std::fs::read(out.path()).unwrap();
        // ehdr + 2 phdrs + 1 shdr.
        assert_eq!(written.len(), 64 + 2 * 56 + 64);
    }
}

//! ELF64 file parser.
//!
//! Reads a file into an [`Elf64Binary`] model: the executable header at
//! offset 0, `e_phnum` program headers from `e_phoff`, `e_shnum` section
//! headers from `e_shoff`, then every section's bytes except `SHT_NOBITS`
//! sections, which occupy no file bytes. Section names are resolved from
//! the string table section named by `e_shstrndx`.
//!
//! The same information can be inspected on a parsed file with
//! `readelf -h`, `readelf -l`, and `readelf -S`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::mem::size_of;
use std::path::Path;

use crate::binary::{Elf64Binary, Elf64Ehdr, Elf64Phdr, Elf64Sc, Elf64Shdr};
use crate::error::{Elf64Error, Elf64Result};

/// ELF64 parser.
pub struct Elf64Parser;

impl Elf64Parser {
    /// Read only the executable header.
    ///
    /// No validation is performed; the caller checks
    /// [`Elf64Ehdr::is_elf64`] before committing to a full parse. This is
    /// the cheap probe the fragmentation analyzer uses to filter out
    /// 32-bit libraries found during a directory walk.
    pub fn parse_header(path: &Path) -> Elf64Result<Elf64Ehdr> {
        let mut file = Self::open(path)?;
        Self::read_ehdr(&mut file, path)
    }

    /// Parse a complete ELF64 file into a model.
    ///
    /// A successfully parsed model has as many sections as section
    /// headers, in matching index order. Any truncated header region is a
    /// fatal error: assuming zero-fill would silently break the writer's
    /// round-trip guarantee.
    pub fn parse_file(path: &Path) -> Elf64Result<Elf64Binary> {
        log::info!("parsing ELF file {}", path.display());

        let mut file = Self::open(path)?;
        let ehdr = Self::read_ehdr(&mut file, path)?;

        if !ehdr.is_elf64() {
            return Err(Elf64Error::NotElf64 {
                path: path.to_path_buf(),
            });
        }

        let phdrs = Self::read_phdrs(&mut file, path, &ehdr)?;
        let shdrs = Self::read_shdrs(&mut file, path, &ehdr)?;
        let sections = Self::read_sections(&mut file, path, &ehdr, &shdrs)?;

        Ok(Elf64Binary {
            ehdr,
            phdrs,
            shdrs,
            sections,
        })
    }

    fn open(path: &Path) -> Elf64Result<File> {
        File::open(path).map_err(|source| Elf64Error::Open {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_ehdr(file: &mut File, path: &Path) -> Elf64Result<Elf64Ehdr> {
        log::debug!("parsing executable header");
        file.seek(SeekFrom::Start(0))?;
        Self::read_record::<Elf64Ehdr>(file).map_err(|_| Elf64Error::Truncated {
            path: path.to_path_buf(),
            region: "executable header".to_string(),
        })
    }

    fn read_phdrs(file: &mut File, path: &Path, ehdr: &Elf64Ehdr) -> Elf64Result<Vec<Elf64Phdr>> {
        let ph_offset = ehdr.e_phoff;
        let ph_num = ehdr.e_phnum;
        log::debug!("parsing {ph_num} program headers at offset {ph_offset:#x}");

        file.seek(SeekFrom::Start(ph_offset))?;

        let mut phdrs = Vec::with_capacity(ph_num as usize);
        for i in 0..ph_num {
            let phdr = Self::read_record::<Elf64Phdr>(file).map_err(|_| Elf64Error::Truncated {
                path: path.to_path_buf(),
                region: format!("program header [{i}]"),
            })?;
            phdrs.push(phdr);
        }

        Ok(phdrs)
    }

    fn read_shdrs(file: &mut File, path: &Path, ehdr: &Elf64Ehdr) -> Elf64Result<Vec<Elf64Shdr>> {
        let sh_offset = ehdr.e_shoff;
        let sh_num = ehdr.e_shnum;
        log::debug!("parsing {sh_num} section headers at offset {sh_offset:#x}");

        file.seek(SeekFrom::Start(sh_offset))?;

        let mut shdrs = Vec::with_capacity(sh_num as usize);
        for i in 0..sh_num {
            let shdr = Self::read_record::<Elf64Shdr>(file).map_err(|_| Elf64Error::Truncated {
                path: path.to_path_buf(),
                region: format!("section header [{i}]"),
            })?;
            shdrs.push(shdr);
        }

        Ok(shdrs)
    }

    fn read_sections(
        file: &mut File,
        path: &Path,
        ehdr: &Elf64Ehdr,
        shdrs: &[Elf64Shdr],
    ) -> Elf64Result<Vec<Elf64Sc>> {
        log::debug!("parsing {} sections", shdrs.len());

        let mut sections = Vec::with_capacity(shdrs.len());
        for (i, shdr) in shdrs.iter().enumerate() {
            let sh_offset = shdr.sh_offset;
            let sh_size = shdr.sh_size;

            // A NOBITS section (.bss) owns no file bytes; its recorded
            // size counts toward memory layout only.
            let data = if shdr.is_nobits() {
                None
            } else {
                let mut buf = vec![0u8; sh_size as usize];
                file.seek(SeekFrom::Start(sh_offset))?;
                file.read_exact(&mut buf).map_err(|_| Elf64Error::Truncated {
                    path: path.to_path_buf(),
                    region: format!("section [{i}] at offset {sh_offset:#x} with size {sh_size}"),
                })?;
                Some(buf)
            };

            sections.push(Elf64Sc {
                name: String::new(),
                size: sh_size,
                data,
                index: i as u16,
            });
        }

        Self::resolve_section_names(ehdr, shdrs, &mut sections);

        Ok(sections)
    }

    /// Resolve every section's display name from the string table section
    /// whose index is `e_shstrndx`. Done after all sections are read
    /// because the string table is itself one of them.
    fn resolve_section_names(ehdr: &Elf64Ehdr, shdrs: &[Elf64Shdr], sections: &mut [Elf64Sc]) {
        let shstrndx = ehdr.e_shstrndx as usize;
        let strtab = match sections.get(shstrndx).and_then(|s| s.data.clone()) {
            Some(data) => data,
            None => {
                log::warn!(
                    "section name string table index {shstrndx} has no content; \
                     section names left empty"
                );
                return;
            }
        };

        for (section, shdr) in sections.iter_mut().zip(shdrs) {
            section.name = Self::resolve_name(&strtab, shdr.sh_name);
        }
    }

    /// Bounds-checked lookup of a NUL-terminated name in a string table.
    fn resolve_name(strtab: &[u8], offset: u32) -> String {
        let start = offset as usize;
        if start >= strtab.len() {
            return String::new();
        }
        let end = strtab[start..]
            .iter()
            .position(|&b| b == 0)
            .map_or(strtab.len(), |nul| start + nul);
        String::from_utf8_lossy(&strtab[start..end]).into_owned()
    }

    /// Read one header record at the current cursor.
    fn read_record<T: Copy>(file: &mut File) -> std::io::Result<T> {
        let mut buf = vec![0u8; size_of::<T>()];
        file.read_exact(&mut buf)?;
        // SAFETY: the buffer holds exactly size_of::<T>() bytes, and this
        // private helper is only instantiated with the repr(C, packed)
        // header records from crate::binary, whose fields are plain
        // integers; every byte pattern is a valid value.
        Ok(unsafe { std::ptr::read_unaligned(buf.as_ptr().cast::<T>()) })
    }
}

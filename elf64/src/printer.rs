//! Human-readable structural dump of a parsed model.
//!
//! Formats already-parsed fields for terminal display; carries no
//! algorithmic weight. The numeric tags are decoded through the enums in
//! [`crate::types`], so an unrecognized constant prints as `UNKNOWN(..)`
//! instead of being dropped.

use std::fmt;

use crate::binary::{Elf64Binary, Elf64Ehdr};
use crate::types::{
    OsAbi, ELFCLASS32, ELFCLASS64, ELFCLASSNONE, ELFDATA2LSB, ELFDATA2MSB, EI_CLASS, EI_DATA,
    EI_OSABI, EI_VERSION, EV_CURRENT, PF_R, PF_W, PF_X,
};

/// Displayable dump of a whole binary: executable header, program header
/// table, section header table.
pub fn dump(binary: &Elf64Binary) -> BinaryDump<'_> {
    BinaryDump(binary)
}

pub struct BinaryDump<'a>(&'a Elf64Binary);

impl fmt::Display for BinaryDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ehdr(f, &self.0.ehdr)?;
        write_phdrs(f, self.0)?;
        write_shdrs(f, self.0)
    }
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "----------------------------------------")?;
    writeln!(f, "{title:^40}")?;
    writeln!(f, "----------------------------------------")
}

const DESC_WIDTH: usize = 35;

fn write_ehdr(f: &mut fmt::Formatter<'_>, ehdr: &Elf64Ehdr) -> fmt::Result {
    banner(f, "ELF64 Executable Header")?;

    write!(f, "{:<DESC_WIDTH$}", "Magic number:")?;
    for byte in ehdr.e_ident {
        write!(f, "{byte:02x} ")?;
    }
    writeln!(f)?;

    let class = match ehdr.e_ident[EI_CLASS] {
        ELFCLASSNONE => "NONE CLASS".to_string(),
        ELFCLASS32 => "ELF 32".to_string(),
        ELFCLASS64 => "ELF 64".to_string(),
        other => format!("UNKNOWN({other:#x})"),
    };
    writeln!(f, "{:<DESC_WIDTH$}{class}", "Class:")?;

    let data = match ehdr.e_ident[EI_DATA] {
        ELFDATA2LSB => "2's complement, little endian".to_string(),
        ELFDATA2MSB => "2's complement, big endian".to_string(),
        other => format!("UNKNOWN({other:#x})"),
    };
    writeln!(f, "{:<DESC_WIDTH$}{data}", "Data:")?;

    let version = match ehdr.e_ident[EI_VERSION] {
        EV_CURRENT => "Current".to_string(),
        other => format!("UNKNOWN({other:#x})"),
    };
    writeln!(f, "{:<DESC_WIDTH$}{version}", "Version:")?;
    writeln!(f, "{:<DESC_WIDTH$}{}", "OS/ABI:", OsAbi::from_raw(ehdr.e_ident[EI_OSABI]))?;
    writeln!(f, "{:<DESC_WIDTH$}{}", "Type:", ehdr.file_type())?;
    writeln!(f, "{:<DESC_WIDTH$}{}", "Machine:", ehdr.machine())?;

    let e_version = ehdr.e_version;
    let e_entry = ehdr.e_entry;
    let e_phoff = ehdr.e_phoff;
    let e_shoff = ehdr.e_shoff;
    let e_flags = ehdr.e_flags;
    let e_ehsize = ehdr.e_ehsize;
    let e_phentsize = ehdr.e_phentsize;
    let e_phnum = ehdr.e_phnum;
    let e_shentsize = ehdr.e_shentsize;
    let e_shnum = ehdr.e_shnum;
    let e_shstrndx = ehdr.e_shstrndx;

    writeln!(f, "{:<DESC_WIDTH$}{e_version}", "File version:")?;
    writeln!(f, "{:<DESC_WIDTH$}{e_entry:#x}", "Entry point VA:")?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_phoff} (bytes into file)",
        "Program header table offset:"
    )?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_shoff} (bytes into file)",
        "Section header table offset:"
    )?;
    writeln!(f, "{:<DESC_WIDTH$}{e_flags:#x}", "Processor-specific flags:")?;
    writeln!(f, "{:<DESC_WIDTH$}{e_ehsize} bytes", "ELF header size:")?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_phentsize} bytes",
        "Program header table entry size:"
    )?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_phnum}",
        "Program header table entry count:"
    )?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_shentsize} bytes",
        "Section header table entry size:"
    )?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_shnum}",
        "Section header table entry count:"
    )?;
    writeln!(
        f,
        "{:<DESC_WIDTH$}{e_shstrndx}",
        "Section header string table index:"
    )
}

fn write_phdrs(f: &mut fmt::Formatter<'_>, binary: &Elf64Binary) -> fmt::Result {
    banner(f, "ELF64 Program Headers")?;
    writeln!(
        f,
        "{:>3} {:<14} {:<6} {:<18} {:<18} {:<10} {:<10} {:<10}",
        "#", "Type", "Flags", "Offset", "VirtAddr", "FileSiz", "MemSiz", "Align"
    )?;

    for (i, phdr) in binary.phdrs.iter().enumerate() {
        let p_offset = phdr.p_offset;
        let p_vaddr = phdr.p_vaddr;
        let p_filesz = phdr.p_filesz;
        let p_memsz = phdr.p_memsz;
        let p_align = phdr.p_align;
        writeln!(
            f,
            "{i:>3} {:<14} {:<6} {p_offset:#018x} {p_vaddr:#018x} {p_filesz:<#10x} \
             {p_memsz:<#10x} {p_align:<#10x}",
            phdr.segment_type().to_string(),
            perm_string(phdr.p_flags),
        )?;
    }
    Ok(())
}

fn write_shdrs(f: &mut fmt::Formatter<'_>, binary: &Elf64Binary) -> fmt::Result {
    banner(f, "ELF64 Section Headers")?;
    writeln!(
        f,
        "{:>3} {:<20} {:<14} {:<10} {:<10} {:<10} {:<10} {:>4} {:>4} {:>5} {:>5}",
        "#", "Name", "Type", "Flags", "Addr", "Offset", "Size", "Lk", "Inf", "Al", "Es"
    )?;

    for (i, shdr) in binary.shdrs.iter().enumerate() {
        let name = binary
            .sections
            .get(i)
            .map_or("", |section| section.name.as_str());
        let sh_flags = shdr.sh_flags;
        let sh_addr = shdr.sh_addr;
        let sh_offset = shdr.sh_offset;
        let sh_size = shdr.sh_size;
        let sh_link = shdr.sh_link;
        let sh_info = shdr.sh_info;
        let sh_addralign = shdr.sh_addralign;
        let sh_entsize = shdr.sh_entsize;
        writeln!(
            f,
            "{i:>3} {name:<20} {:<14} {sh_flags:<#10x} {sh_addr:<#10x} {sh_offset:<#10x} \
             {sh_size:<#10x} {sh_link:>4} {sh_info:>4} {sh_addralign:>5} {sh_entsize:>5}",
            shdr.section_type().to_string(),
        )?;
    }
    Ok(())
}

/// Render `p_flags` in the `rwx` style of /proc/pid/maps.
fn perm_string(p_flags: u32) -> String {
    let mut perms = String::with_capacity(3);
    perms.push(if p_flags & PF_R != 0 { 'r' } else { '-' });
    perms.push(if p_flags & PF_W != 0 { 'w' } else { '-' });
    perms.push(if p_flags & PF_X != 0 { 'x' } else { '-' });
    perms
}

//! In-memory model of an ELF64 file.
//!
//! An ELF binary is formed by four parts, laid out in this order in every
//! file this toolchain reads or writes:
//!
//! ```text
//!     ______________________
//!     |                    |
//!     | Executable header  |
//!     |____________________|
//!     |                    |
//!     |  Program headers   |
//!     |____________________|
//!     |                    |
//!     |      Sections      |
//!     |____________________|
//!     |                    |
//!     |  Section headers   |
//!     |____________________|
//! ```
//!
//! [`Elf64Binary`] owns all four parts for the lifetime of a run. It is a
//! pure data container: structural invariants are established by the parser
//! and the model does no validation of its own.

use crate::types::{
    PermissionClass, SectionType, SegmentType, EI_CLASS, ELFCLASS64, ELF_MAGIC, PF_R, PF_W, PF_X,
    PT_LOAD, SHT_NOBITS,
};

/// ELF64 executable (file) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct Elf64Ehdr {
    /// Magic number and other identification info
    pub e_ident: [u8; 16],
    /// Object file type
    pub e_type: u16,
    /// Machine type
    pub e_machine: u16,
    /// Object file version
    pub e_version: u32,
    /// Entry point virtual address
    pub e_entry: u64,
    /// Program header table file offset
    pub e_phoff: u64,
    /// Section header table file offset
    pub e_shoff: u64,
    /// Processor-specific flags
    pub e_flags: u32,
    /// ELF header size
    pub e_ehsize: u16,
    /// Program header table entry size
    pub e_phentsize: u16,
    /// Program header table entry count
    pub e_phnum: u16,
    /// Section header table entry size
    pub e_shentsize: u16,
    /// Section header table entry count
    pub e_shnum: u16,
    /// Section name string table index
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    /// Check the magic number and the 64-bit class byte.
    ///
    /// This is the cheap probe the fragmentation analyzer runs before
    /// committing to a full parse.
    pub fn is_elf64(&self) -> bool {
        self.e_ident[0..4] == ELF_MAGIC && self.e_ident[EI_CLASS] == ELFCLASS64
    }

    /// Decoded file type tag.
    pub fn file_type(&self) -> crate::types::FileType {
        crate::types::FileType::from_raw(self.e_type)
    }

    /// Decoded machine tag.
    pub fn machine(&self) -> crate::types::Machine {
        crate::types::Machine::from_raw(self.e_machine)
    }
}

/// ELF64 program (segment) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct Elf64Phdr {
    /// Segment type
    pub p_type: u32,
    /// Segment flags
    pub p_flags: u32,
    /// Segment file offset
    pub p_offset: u64,
    /// Segment virtual address
    pub p_vaddr: u64,
    /// Segment physical address
    pub p_paddr: u64,
    /// Segment size in file
    pub p_filesz: u64,
    /// Segment size in memory
    pub p_memsz: u64,
    /// Segment alignment
    pub p_align: u64,
}

impl Elf64Phdr {
    /// Check if this is a loadable segment.
    pub fn is_load(&self) -> bool {
        self.p_type == PT_LOAD
    }

    /// Check if the segment is readable.
    pub fn is_readable(&self) -> bool {
        self.p_flags & PF_R != 0
    }

    /// Check if the segment is writable.
    pub fn is_writable(&self) -> bool {
        self.p_flags & PF_W != 0
    }

    /// Check if the segment is executable.
    pub fn is_executable(&self) -> bool {
        self.p_flags & PF_X != 0
    }

    /// Check if the segment falls in the executable permission bucket.
    pub fn is_exec_class(&self) -> bool {
        self.permission_class() == PermissionClass::Exec
    }

    /// Check if the segment falls in the read-only permission bucket.
    pub fn is_read_only_class(&self) -> bool {
        self.permission_class() == PermissionClass::ReadOnly
    }

    /// Check if the segment falls in the read-write permission bucket.
    pub fn is_read_write_class(&self) -> bool {
        self.permission_class() == PermissionClass::ReadWrite
    }

    /// Mutually exclusive permission bucket for this segment.
    pub fn permission_class(&self) -> PermissionClass {
        PermissionClass::classify(self.p_flags)
    }

    /// Decoded segment type tag.
    pub fn segment_type(&self) -> SegmentType {
        SegmentType::from_raw(self.p_type)
    }
}

/// ELF64 section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct Elf64Shdr {
    /// Section name (offset into the section header string table)
    pub sh_name: u32,
    /// Section type
    pub sh_type: u32,
    /// Section flags
    pub sh_flags: u64,
    /// Section virtual address
    pub sh_addr: u64,
    /// Section file offset
    pub sh_offset: u64,
    /// Section size in bytes
    pub sh_size: u64,
    /// Link to another section
    pub sh_link: u32,
    /// Additional section information
    pub sh_info: u32,
    /// Section alignment
    pub sh_addralign: u64,
    /// Entry size if the section holds a table
    pub sh_entsize: u64,
}

impl Elf64Shdr {
    /// Check for a section with no file-resident bytes (.bss).
    pub fn is_nobits(&self) -> bool {
        self.sh_type == SHT_NOBITS
    }

    /// Decoded section type tag.
    pub fn section_type(&self) -> SectionType {
        SectionType::from_raw(self.sh_type)
    }
}

/// Resolved content of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elf64Sc {
    /// Resolved section name.
    pub name: String,
    /// Size recorded in the section header. For a NOBITS section this
    /// counts toward the memory layout only.
    pub size: u64,
    /// Raw section bytes. `None` for NOBITS sections.
    pub data: Option<Vec<u8>>,
    /// Index of the section in the section header table.
    pub index: u16,
}

/// An ELF64 binary: executable header, program headers, section headers,
/// and resolved section contents.
///
/// A successfully parsed model has as many [`Elf64Sc`] entries as
/// [`Elf64Shdr`] entries, in matching index order. The aligner may mutate
/// `PT_LOAD` size fields in place; nothing else resizes or reorders the
/// owned collections after parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Elf64Binary {
    /// Executable header.
    pub ehdr: Elf64Ehdr,
    /// Program headers, in file order.
    pub phdrs: Vec<Elf64Phdr>,
    /// Section headers, in file order.
    pub shdrs: Vec<Elf64Shdr>,
    /// Section contents, index-matched with `shdrs`.
    pub sections: Vec<Elf64Sc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PF_R, PF_W, PF_X};
    use core::mem::size_of;

    #[test]
    fn header_records_match_on_disk_sizes() {
        assert_eq!(size_of::<Elf64Ehdr>(), 64);
        assert_eq!(size_of::<Elf64Phdr>(), 56);
        assert_eq!(size_of::<Elf64Shdr>(), 64);
    }

    #[test]
    fn permission_bucket_helpers_are_exclusive() {
        let mut phdr = Elf64Phdr {
            p_type: PT_LOAD,
            p_flags: PF_R | PF_X,
            p_offset: 0,
            p_vaddr: 0,
            p_paddr: 0,
            p_filesz: 0,
            p_memsz: 0,
            p_align: 0x1000,
        };
        assert!(phdr.is_exec_class());
        assert!(!phdr.is_read_only_class());
        assert!(!phdr.is_read_write_class());

        phdr.p_flags = PF_R | PF_W;
        assert!(phdr.is_read_write_class());
        assert!(!phdr.is_exec_class());

        phdr.p_flags = PF_R;
        assert!(phdr.is_read_only_class());
    }

    #[test]
    fn ident_probe_requires_magic_and_class() {
        let mut ehdr = Elf64Ehdr {
            e_ident: [0; 16],
            e_type: 0,
            e_machine: 0,
            e_version: 0,
            e_entry: 0,
            e_phoff: 0,
            e_shoff: 0,
            e_flags: 0,
            e_ehsize: 0,
            e_phentsize: 0,
            e_phnum: 0,
            e_shentsize: 0,
            e_shnum: 0,
            e_shstrndx: 0,
        };
        assert!(!ehdr.is_elf64());

        ehdr.e_ident[0..4].copy_from_slice(&ELF_MAGIC);
        assert!(!ehdr.is_elf64(), "magic alone is not enough");

        ehdr.e_ident[EI_CLASS] = ELFCLASS64;
        assert!(ehdr.is_elf64());
    }
}

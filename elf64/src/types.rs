//! ELF64 constants and decoded tag enumerations.
//!
//! The on-disk records in [`crate::binary`] keep their raw integer tags so
//! serialization stays byte-exact. The enums here are the decoded view used
//! for classification and display; each one carries an `Unknown` fallback so
//! a constant this crate does not know about is still representable.

use std::fmt;

use serde::Serialize;

/// ELF magic number: 0x7F 'E' 'L' 'F'
pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Size of the `e_ident` identification array.
pub const EI_NIDENT: usize = 16;

/// Byte index of the ELF class field in `e_ident`.
pub const EI_CLASS: usize = 4;

/// Byte index of the data encoding field in `e_ident`.
pub const EI_DATA: usize = 5;

/// Byte index of the ELF version field in `e_ident`.
pub const EI_VERSION: usize = 6;

/// Byte index of the OS/ABI field in `e_ident`.
pub const EI_OSABI: usize = 7;

/// ELF class: invalid.
pub const ELFCLASSNONE: u8 = 0;

/// ELF class: 32-bit object.
pub const ELFCLASS32: u8 = 1;

/// ELF class: 64-bit object.
pub const ELFCLASS64: u8 = 2;

/// ELF data encoding: 2's complement, little endian.
pub const ELFDATA2LSB: u8 = 1;

/// ELF data encoding: 2's complement, big endian.
pub const ELFDATA2MSB: u8 = 2;

/// ELF version: current.
pub const EV_CURRENT: u8 = 1;

/// Program header type: unused entry.
pub const PT_NULL: u32 = 0;

/// Program header type: loadable segment.
pub const PT_LOAD: u32 = 1;

/// Program header type: dynamic linking info.
pub const PT_DYNAMIC: u32 = 2;

/// Program header type: interpreter path.
pub const PT_INTERP: u32 = 3;

/// Program header type: auxiliary note.
pub const PT_NOTE: u32 = 4;

/// Program header type: reserved.
pub const PT_SHLIB: u32 = 5;

/// Program header type: program header table.
pub const PT_PHDR: u32 = 6;

/// Program header type: thread-local storage template.
pub const PT_TLS: u32 = 7;

/// Program header type: GNU exception-handling frame.
pub const PT_GNU_EH_FRAME: u32 = 0x6474_e550;

/// Program header type: GNU stack executability marker.
pub const PT_GNU_STACK: u32 = 0x6474_e551;

/// Program header type: GNU read-only-after-relocation region.
pub const PT_GNU_RELRO: u32 = 0x6474_e552;

/// Program header type: GNU property note.
pub const PT_GNU_PROPERTY: u32 = 0x6474_e553;

/// Segment permission: executable.
pub const PF_X: u32 = 1;

/// Segment permission: writable.
pub const PF_W: u32 = 2;

/// Segment permission: readable.
pub const PF_R: u32 = 4;

/// Section type: unused entry.
pub const SHT_NULL: u32 = 0;

/// Section type: program data.
pub const SHT_PROGBITS: u32 = 1;

/// Section type: symbol table.
pub const SHT_SYMTAB: u32 = 2;

/// Section type: string table.
pub const SHT_STRTAB: u32 = 3;

/// Section type: relocation entries with addends.
pub const SHT_RELA: u32 = 4;

/// Section type: symbol hash table.
pub const SHT_HASH: u32 = 5;

/// Section type: dynamic linking info.
pub const SHT_DYNAMIC: u32 = 6;

/// Section type: note section.
pub const SHT_NOTE: u32 = 7;

/// Section type: occupies memory but no file bytes (.bss).
pub const SHT_NOBITS: u32 = 8;

/// Section type: relocation entries, no addends.
pub const SHT_REL: u32 = 9;

/// Section type: reserved.
pub const SHT_SHLIB: u32 = 10;

/// Section type: dynamic symbol table.
pub const SHT_DYNSYM: u32 = 11;

/// Section type: constructor array.
pub const SHT_INIT_ARRAY: u32 = 14;

/// Section type: destructor array.
pub const SHT_FINI_ARRAY: u32 = 15;

/// Section type: pre-constructor array.
pub const SHT_PREINIT_ARRAY: u32 = 16;

/// Section type: section group.
pub const SHT_GROUP: u32 = 17;

/// Section type: extended section indices.
pub const SHT_SYMTAB_SHNDX: u32 = 18;

/// Section flag: writable at runtime.
pub const SHF_WRITE: u64 = 0x1;

/// Section flag: occupies memory at runtime.
pub const SHF_ALLOC: u64 = 0x2;

/// Section flag: contains executable instructions.
pub const SHF_EXECINSTR: u64 = 0x4;

/// Section flag: may be merged.
pub const SHF_MERGE: u64 = 0x10;

/// Section flag: contains NUL-terminated strings.
pub const SHF_STRINGS: u64 = 0x20;

/// ELF file type: none.
pub const ET_NONE: u16 = 0;

/// ELF file type: relocatable object.
pub const ET_REL: u16 = 1;

/// ELF file type: static executable.
pub const ET_EXEC: u16 = 2;

/// ELF file type: shared object (or PIE).
pub const ET_DYN: u16 = 3;

/// ELF file type: core dump.
pub const ET_CORE: u16 = 4;

/// Machine type: x86-64.
pub const EM_X86_64: u16 = 62;

/// Machine type: AArch64.
pub const EM_AARCH64: u16 = 183;

/// Machine type: RISC-V.
pub const EM_RISCV: u16 = 243;

/// Decoded `p_type` segment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    GnuProperty,
    /// A tag this crate does not decode; the raw value is preserved.
    Unknown(u32),
}

impl SegmentType {
    pub fn from_raw(p_type: u32) -> Self {
        match p_type {
            PT_NULL => Self::Null,
            PT_LOAD => Self::Load,
            PT_DYNAMIC => Self::Dynamic,
            PT_INTERP => Self::Interp,
            PT_NOTE => Self::Note,
            PT_SHLIB => Self::Shlib,
            PT_PHDR => Self::Phdr,
            PT_TLS => Self::Tls,
            PT_GNU_EH_FRAME => Self::GnuEhFrame,
            PT_GNU_STACK => Self::GnuStack,
            PT_GNU_RELRO => Self::GnuRelro,
            PT_GNU_PROPERTY => Self::GnuProperty,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Load => write!(f, "LOAD"),
            Self::Dynamic => write!(f, "DYNAMIC"),
            Self::Interp => write!(f, "INTERP"),
            Self::Note => write!(f, "NOTE"),
            Self::Shlib => write!(f, "SHLIB"),
            Self::Phdr => write!(f, "PHDR"),
            Self::Tls => write!(f, "TLS"),
            Self::GnuEhFrame => write!(f, "GNU_EH_FRAME"),
            Self::GnuStack => write!(f, "GNU_STACK"),
            Self::GnuRelro => write!(f, "GNU_RELRO"),
            Self::GnuProperty => write!(f, "GNU_PROPERTY"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw:#x})"),
        }
    }
}

/// Decoded `sh_type` section tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    Null,
    Progbits,
    Symtab,
    Strtab,
    Rela,
    Hash,
    Dynamic,
    Note,
    Nobits,
    Rel,
    Shlib,
    Dynsym,
    InitArray,
    FiniArray,
    PreinitArray,
    Group,
    SymtabShndx,
    /// A tag this crate does not decode; the raw value is preserved.
    Unknown(u32),
}

impl SectionType {
    pub fn from_raw(sh_type: u32) -> Self {
        match sh_type {
            SHT_NULL => Self::Null,
            SHT_PROGBITS => Self::Progbits,
            SHT_SYMTAB => Self::Symtab,
            SHT_STRTAB => Self::Strtab,
            SHT_RELA => Self::Rela,
            SHT_HASH => Self::Hash,
            SHT_DYNAMIC => Self::Dynamic,
            SHT_NOTE => Self::Note,
            SHT_NOBITS => Self::Nobits,
            SHT_REL => Self::Rel,
            SHT_SHLIB => Self::Shlib,
            SHT_DYNSYM => Self::Dynsym,
            SHT_INIT_ARRAY => Self::InitArray,
            SHT_FINI_ARRAY => Self::FiniArray,
            SHT_PREINIT_ARRAY => Self::PreinitArray,
            SHT_GROUP => Self::Group,
            SHT_SYMTAB_SHNDX => Self::SymtabShndx,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Progbits => write!(f, "PROGBITS"),
            Self::Symtab => write!(f, "SYMTAB"),
            Self::Strtab => write!(f, "STRTAB"),
            Self::Rela => write!(f, "RELA"),
            Self::Hash => write!(f, "HASH"),
            Self::Dynamic => write!(f, "DYNAMIC"),
            Self::Note => write!(f, "NOTE"),
            Self::Nobits => write!(f, "NOBITS"),
            Self::Rel => write!(f, "REL"),
            Self::Shlib => write!(f, "SHLIB"),
            Self::Dynsym => write!(f, "DYNSYM"),
            Self::InitArray => write!(f, "INIT_ARRAY"),
            Self::FiniArray => write!(f, "FINI_ARRAY"),
            Self::PreinitArray => write!(f, "PREINIT_ARRAY"),
            Self::Group => write!(f, "GROUP"),
            Self::SymtabShndx => write!(f, "SYMTAB_SHNDX"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw:#x})"),
        }
    }
}

/// Decoded `e_type` file tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    None,
    Relocatable,
    Executable,
    SharedObject,
    Core,
    Unknown(u16),
}

impl FileType {
    pub fn from_raw(e_type: u16) -> Self {
        match e_type {
            ET_NONE => Self::None,
            ET_REL => Self::Relocatable,
            ET_EXEC => Self::Executable,
            ET_DYN => Self::SharedObject,
            ET_CORE => Self::Core,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Relocatable => write!(f, "REL (relocatable file)"),
            Self::Executable => write!(f, "EXEC (executable file)"),
            Self::SharedObject => write!(f, "DYN (shared object file)"),
            Self::Core => write!(f, "CORE (core file)"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw:#x})"),
        }
    }
}

/// Decoded `e_machine` architecture tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    X86_64,
    Aarch64,
    RiscV,
    Unknown(u16),
}

impl Machine {
    pub fn from_raw(e_machine: u16) -> Self {
        match e_machine {
            EM_X86_64 => Self::X86_64,
            EM_AARCH64 => Self::Aarch64,
            EM_RISCV => Self::RiscV,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => write!(f, "Advanced Micro Devices X86-64"),
            Self::Aarch64 => write!(f, "AArch64"),
            Self::RiscV => write!(f, "RISC-V"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw:#x})"),
        }
    }
}

/// Decoded `e_ident[EI_OSABI]` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsAbi {
    SystemV,
    Gnu,
    Unknown(u8),
}

impl OsAbi {
    pub fn from_raw(osabi: u8) -> Self {
        match osabi {
            0 => Self::SystemV,
            3 => Self::Gnu,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for OsAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemV => write!(f, "UNIX - System V"),
            Self::Gnu => write!(f, "UNIX - GNU"),
            Self::Unknown(raw) => write!(f, "UNKNOWN({raw:#x})"),
        }
    }
}

/// Mutually exclusive permission bucket for a loadable segment.
///
/// Executable wins over writable, writable over read-only, so every
/// `PT_LOAD` segment lands in exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionClass {
    Exec,
    ReadOnly,
    ReadWrite,
}

impl PermissionClass {
    /// Classify a `p_flags` value into its permission bucket.
    pub fn classify(p_flags: u32) -> Self {
        if p_flags & PF_X != 0 {
            Self::Exec
        } else if p_flags & PF_W != 0 {
            Self::ReadWrite
        } else {
            Self::ReadOnly
        }
    }
}

impl fmt::Display for PermissionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec => write!(f, "exec"),
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

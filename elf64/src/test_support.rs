//! Shared fixtures for the unit tests: a small synthetic shared object
//! built byte-by-byte, with a layout the writer can reproduce exactly.
//!
//! Layout of the sample file (472 bytes total):
//!
//! ```text
//!   0..64    executable header
//!  64..176   2 program headers (LOAD r-x, LOAD rw-)
//! 176..192   .text      (PROGBITS, 16 bytes)
//!     192    .bss       (NOBITS, 32 bytes, no file content)
//! 192..214   .shstrtab  (STRTAB, 22 bytes)
//! 214..216   zero padding
//! 216..472   4 section headers
//! ```

use std::io::Write;

use tempfile::NamedTempFile;

use crate::types::{
    ELFCLASS64, ELFDATA2LSB, ELF_MAGIC, EM_X86_64, ET_DYN, PF_R, PF_W, PF_X, PT_LOAD,
    SHT_NOBITS, SHT_PROGBITS, SHT_STRTAB,
};

/// File offset of the section header table in the sample image.
pub const SAMPLE_SHOFF: u64 = 216;

/// `p_memsz` of the read-write segment (the .bss image).
pub const SAMPLE_RW_MEMSZ: u64 = 32;

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Build the sample shared object as raw bytes.
pub fn sample_elf_bytes() -> Vec<u8> {
    let mut elf = vec![0u8; 472];

    // Executable header.
    put(&mut elf, 0, &ELF_MAGIC);
    elf[4] = ELFCLASS64;
    elf[5] = ELFDATA2LSB;
    elf[6] = 1; // EV_CURRENT
    put(&mut elf, 16, &ET_DYN.to_le_bytes());
    put(&mut elf, 18, &EM_X86_64.to_le_bytes());
    put(&mut elf, 20, &1u32.to_le_bytes()); // e_version
    put(&mut elf, 24, &0x1000u64.to_le_bytes()); // e_entry
    put(&mut elf, 32, &64u64.to_le_bytes()); // e_phoff
    put(&mut elf, 40, &SAMPLE_SHOFF.to_le_bytes()); // e_shoff
    put(&mut elf, 52, &64u16.to_le_bytes()); // e_ehsize
    put(&mut elf, 54, &56u16.to_le_bytes()); // e_phentsize
    put(&mut elf, 56, &2u16.to_le_bytes()); // e_phnum
    put(&mut elf, 58, &64u16.to_le_bytes()); // e_shentsize
    put(&mut elf, 60, &4u16.to_le_bytes()); // e_shnum
    put(&mut elf, 62, &3u16.to_le_bytes()); // e_shstrndx

    // Program header 0: LOAD r-x covering ehdr + phdrs + .text.
    put(&mut elf, 64, &PT_LOAD.to_le_bytes());
    put(&mut elf, 68, &(PF_R | PF_X).to_le_bytes());
    put(&mut elf, 72, &0u64.to_le_bytes()); // p_offset
    put(&mut elf, 80, &0u64.to_le_bytes()); // p_vaddr
    put(&mut elf, 88, &0u64.to_le_bytes()); // p_paddr
    put(&mut elf, 96, &192u64.to_le_bytes()); // p_filesz
    put(&mut elf, 104, &192u64.to_le_bytes()); // p_memsz
    put(&mut elf, 112, &0x1000u64.to_le_bytes()); // p_align

    // Program header 1: LOAD rw- covering .bss (no file content).
    put(&mut elf, 120, &PT_LOAD.to_le_bytes());
    put(&mut elf, 124, &(PF_R | PF_W).to_le_bytes());
    put(&mut elf, 128, &192u64.to_le_bytes()); // p_offset
    put(&mut elf, 136, &0x2000u64.to_le_bytes()); // p_vaddr
    put(&mut elf, 144, &0x2000u64.to_le_bytes()); // p_paddr
    put(&mut elf, 152, &0u64.to_le_bytes()); // p_filesz
    put(&mut elf, 160, &SAMPLE_RW_MEMSZ.to_le_bytes()); // p_memsz
    put(&mut elf, 168, &0x1000u64.to_le_bytes()); // p_align

    // .text content.
    for i in 0..16u8 {
        elf[176 + i as usize] = i;
    }

    // .shstrtab content: "\0.text\0.bss\0.shstrtab\0".
    put(&mut elf, 192, b"\0.text\0.bss\0.shstrtab\0");

    // Section header 0: SHT_NULL, all zeros (already zeroed).

    // Section header 1: .text.
    let sh = 216 + 64;
    put(&mut elf, sh, &1u32.to_le_bytes()); // sh_name
    put(&mut elf, sh + 4, &SHT_PROGBITS.to_le_bytes());
    put(&mut elf, sh + 8, &0x6u64.to_le_bytes()); // SHF_ALLOC | SHF_EXECINSTR
    put(&mut elf, sh + 16, &0xb0u64.to_le_bytes()); // sh_addr
    put(&mut elf, sh + 24, &176u64.to_le_bytes()); // sh_offset
    put(&mut elf, sh + 32, &16u64.to_le_bytes()); // sh_size
    put(&mut elf, sh + 48, &16u64.to_le_bytes()); // sh_addralign

    // Section header 2: .bss (NOBITS).
    let sh = 216 + 2 * 64;
    put(&mut elf, sh, &7u32.to_le_bytes()); // sh_name
    put(&mut elf, sh + 4, &SHT_NOBITS.to_le_bytes());
    put(&mut elf, sh + 8, &0x3u64.to_le_bytes()); // SHF_WRITE | SHF_ALLOC
    put(&mut elf, sh + 16, &0x2000u64.to_le_bytes()); // sh_addr
    put(&mut elf, sh + 24, &192u64.to_le_bytes()); // sh_offset
    put(&mut elf, sh + 32, &SAMPLE_RW_MEMSZ.to_le_bytes()); // sh_size
    put(&mut elf, sh + 48, &8u64.to_le_bytes()); // sh_addralign

    // Section header 3: .shstrtab.
    let sh = 216 + 3 * 64;
    put(&mut elf, sh, &12u32.to_le_bytes()); // sh_name
    put(&mut elf, sh + 4, &SHT_STRTAB.to_le_bytes());
    put(&mut elf, sh + 24, &192u64.to_le_bytes()); // sh_offset
    put(&mut elf, sh + 32, &22u64.to_le_bytes()); // sh_size
    put(&mut elf, sh + 48, &1u64.to_le_bytes()); // sh_addralign

    elf
}

/// Write raw bytes to a temp file and return its handle.
pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Parse the sample image into a model, via a temp file.
pub fn sample_binary() -> crate::binary::Elf64Binary {
    let file = write_temp(&sample_elf_bytes());
    crate::parser::Elf64Parser::parse_file(file.path()).expect("sample image parses")
}

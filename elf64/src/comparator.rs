//! Deep structural comparison of two parsed models.
//!
//! Used to confirm that rewriting preserves everything except the intended
//! change: after `elfalign`, the executable header, section headers, and
//! section bytes must compare equal and only `PT_LOAD` sizes may differ.
//!
//! A difference is a finding, not an error. Every differing field is
//! reported individually so the exact change can be identified, and the
//! overall verdict of each check is the conjunction of its field checks.
//! Neither model is mutated.

use std::fmt;

use serde::Serialize;

use crate::binary::{Elf64Binary, Elf64Ehdr, Elf64Phdr, Elf64Sc, Elf64Shdr};

/// Result of comparing two models: four per-part verdicts plus every
/// individual field difference found.
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub ehdrs_equal: bool,
    pub phdrs_equal: bool,
    pub shdrs_equal: bool,
    pub sections_equal: bool,
    /// One entry per differing field, in check order.
    pub findings: Vec<String>,
}

impl DiffReport {
    /// True when all four checks passed.
    pub fn fully_equal(&self) -> bool {
        self.ehdrs_equal && self.phdrs_equal && self.shdrs_equal && self.sections_equal
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(f, "{finding}")?;
        }
        writeln!(f, "{}", verdict("Executable Headers", self.ehdrs_equal))?;
        writeln!(f, "{}", verdict("Program Headers", self.phdrs_equal))?;
        writeln!(f, "{}", verdict("Section Headers", self.shdrs_equal))?;
        write!(f, "{}", verdict("Sections", self.sections_equal))
    }
}

fn verdict(part: &str, equal: bool) -> String {
    if equal {
        format!("-- {part} are equal --")
    } else {
        format!("-- {part} are NOT equal --")
    }
}

/// Field-by-field comparator for two ELF64 models.
pub struct Elf64Comparator;

impl Elf64Comparator {
    /// Run all four checks and collect the findings.
    pub fn compare(binary1: &Elf64Binary, binary2: &Elf64Binary) -> DiffReport {
        let mut findings = Vec::new();
        let ehdrs_equal = Self::ehdrs_equal(&binary1.ehdr, &binary2.ehdr, &mut findings);
        let phdrs_equal = Self::phdrs_equal(&binary1.phdrs, &binary2.phdrs, &mut findings);
        let shdrs_equal = Self::shdrs_equal(&binary1.shdrs, &binary2.shdrs, &mut findings);
        let sections_equal =
            Self::sections_equal(&binary1.sections, &binary2.sections, &mut findings);

        DiffReport {
            ehdrs_equal,
            phdrs_equal,
            shdrs_equal,
            sections_equal,
            findings,
        }
    }

    /// Compare the executable headers field by field.
    pub fn ehdrs_equal(ehdr1: &Elf64Ehdr, ehdr2: &Elf64Ehdr, findings: &mut Vec<String>) -> bool {
        let mut equal = true;

        for i in 0..ehdr1.e_ident.len() {
            if ehdr1.e_ident[i] != ehdr2.e_ident[i] {
                findings.push(format!(
                    "e_ident[{i}]: {:#04x} != {:#04x}",
                    ehdr1.e_ident[i], ehdr2.e_ident[i]
                ));
                equal = false;
            }
        }

        equal &= field_eq(findings, "e_type", ehdr1.e_type as u64, ehdr2.e_type as u64);
        equal &= field_eq(
            findings,
            "e_machine",
            ehdr1.e_machine as u64,
            ehdr2.e_machine as u64,
        );
        equal &= field_eq(
            findings,
            "e_version",
            ehdr1.e_version as u64,
            ehdr2.e_version as u64,
        );
        equal &= field_eq(findings, "e_entry", ehdr1.e_entry, ehdr2.e_entry);
        equal &= field_eq(findings, "e_phoff", ehdr1.e_phoff, ehdr2.e_phoff);
        equal &= field_eq(findings, "e_shoff", ehdr1.e_shoff, ehdr2.e_shoff);
        equal &= field_eq(
            findings,
            "e_flags",
            ehdr1.e_flags as u64,
            ehdr2.e_flags as u64,
        );
        equal &= field_eq(
            findings,
            "e_ehsize",
            ehdr1.e_ehsize as u64,
            ehdr2.e_ehsize as u64,
        );
        equal &= field_eq(
            findings,
            "e_phentsize",
            ehdr1.e_phentsize as u64,
            ehdr2.e_phentsize as u64,
        );
        equal &= field_eq(
            findings,
            "e_phnum",
            ehdr1.e_phnum as u64,
            ehdr2.e_phnum as u64,
        );
        equal &= field_eq(
            findings,
            "e_shentsize",
            ehdr1.e_shentsize as u64,
            ehdr2.e_shentsize as u64,
        );
        equal &= field_eq(
            findings,
            "e_shnum",
            ehdr1.e_shnum as u64,
            ehdr2.e_shnum as u64,
        );
        equal &= field_eq(
            findings,
            "e_shstrndx",
            ehdr1.e_shstrndx as u64,
            ehdr2.e_shstrndx as u64,
        );

        equal
    }

    /// Compare the program header tables. Aborts early if the counts
    /// differ; otherwise every field of every pair at matching index is
    /// checked.
    pub fn phdrs_equal(
        phdrs1: &[Elf64Phdr],
        phdrs2: &[Elf64Phdr],
        findings: &mut Vec<String>,
    ) -> bool {
        if phdrs1.len() != phdrs2.len() {
            findings.push(format!(
                "different number of program headers: {} != {}",
                phdrs1.len(),
                phdrs2.len()
            ));
            return false;
        }

        let mut equal = true;
        for (i, (phdr1, phdr2)) in phdrs1.iter().zip(phdrs2).enumerate() {
            let label = |field: &str| format!("phdr[{i}].{field}");
            equal &= field_eq(
                findings,
                &label("p_type"),
                phdr1.p_type as u64,
                phdr2.p_type as u64,
            );
            equal &= field_eq(
                findings,
                &label("p_flags"),
                phdr1.p_flags as u64,
                phdr2.p_flags as u64,
            );
            equal &= field_eq(findings, &label("p_offset"), phdr1.p_offset, phdr2.p_offset);
            equal &= field_eq(findings, &label("p_vaddr"), phdr1.p_vaddr, phdr2.p_vaddr);
            equal &= field_eq(findings, &label("p_paddr"), phdr1.p_paddr, phdr2.p_paddr);
            equal &= field_eq(findings, &label("p_filesz"), phdr1.p_filesz, phdr2.p_filesz);
            equal &= field_eq(findings, &label("p_memsz"), phdr1.p_memsz, phdr2.p_memsz);
            equal &= field_eq(findings, &label("p_align"), phdr1.p_align, phdr2.p_align);
        }

        equal
    }

    /// Compare the section header tables, with the same early-abort
    /// policy as the program header check.
    pub fn shdrs_equal(
        shdrs1: &[Elf64Shdr],
        shdrs2: &[Elf64Shdr],
        findings: &mut Vec<String>,
    ) -> bool {
        if shdrs1.len() != shdrs2.len() {
            findings.push(format!(
                "different number of section headers: {} != {}",
                shdrs1.len(),
                shdrs2.len()
            ));
            return false;
        }

        let mut equal = true;
        for (i, (shdr1, shdr2)) in shdrs1.iter().zip(shdrs2).enumerate() {
            let label = |field: &str| format!("shdr[{i}].{field}");
            equal &= field_eq(
                findings,
                &label("sh_name"),
                shdr1.sh_name as u64,
                shdr2.sh_name as u64,
            );
            equal &= field_eq(
                findings,
                &label("sh_type"),
                shdr1.sh_type as u64,
                shdr2.sh_type as u64,
            );
            equal &= field_eq(findings, &label("sh_flags"), shdr1.sh_flags, shdr2.sh_flags);
            equal &= field_eq(findings, &label("sh_addr"), shdr1.sh_addr, shdr2.sh_addr);
            equal &= field_eq(findings, &label("sh_offset"), shdr1.sh_offset, shdr2.sh_offset);
            equal &= field_eq(findings, &label("sh_size"), shdr1.sh_size, shdr2.sh_size);
            equal &= field_eq(
                findings,
                &label("sh_link"),
                shdr1.sh_link as u64,
                shdr2.sh_link as u64,
            );
            equal &= field_eq(
                findings,
                &label("sh_info"),
                shdr1.sh_info as u64,
                shdr2.sh_info as u64,
            );
            equal &= field_eq(
                findings,
                &label("sh_addralign"),
                shdr1.sh_addralign,
                shdr2.sh_addralign,
            );
            equal &= field_eq(
                findings,
                &label("sh_entsize"),
                shdr1.sh_entsize,
                shdr2.sh_entsize,
            );
        }

        equal
    }

    /// Compare section byte content.
    ///
    /// If recorded sizes differ the content is not compared and the pair
    /// is marked different. Two NOBITS sections are equal; a NOBITS
    /// section paired with a content-bearing one is not.
    pub fn sections_equal(
        sections1: &[Elf64Sc],
        sections2: &[Elf64Sc],
        findings: &mut Vec<String>,
    ) -> bool {
        if sections1.len() != sections2.len() {
            findings.push(format!(
                "different number of sections: {} != {}",
                sections1.len(),
                sections2.len()
            ));
            return false;
        }

        let mut equal = true;
        for (i, (section1, section2)) in sections1.iter().zip(sections2).enumerate() {
            if section1.size != section2.size {
                findings.push(format!(
                    "section[{i}].size: {} != {}",
                    section1.size, section2.size
                ));
                equal = false;
                continue;
            }

            match (&section1.data, &section2.data) {
                (None, None) => {}
                (Some(data1), Some(data2)) => {
                    if data1 != data2 {
                        findings.push(format!(
                            "section[{i}] '{}': content differs",
                            section1.name
                        ));
                        equal = false;
                    }
                }
                _ => {
                    findings.push(format!(
                        "section[{i}]: NOBITS in one file but not the other"
                    ));
                    equal = false;
                }
            }
        }

        equal
    }
}

fn field_eq(findings: &mut Vec<String>, label: &str, value1: u64, value2: u64) -> bool {
    if value1 == value2 {
        true
    } else {
        findings.push(format!("{label}: {value1:#x} != {value2:#x}"));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_binary;

    #[test]
    fn identical_models_compare_fully_equal() {
        let binary = sample_binary();
        let report = Elf64Comparator::compare(&binary, &binary.clone());
        assert!(report.fully_equal());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn single_phdr_field_change_is_named_exactly() {
        let binary1 = sample_binary();
        let mut binary2 = binary1.clone();
        binary2.phdrs[1].p_memsz += 1;

        let report = Elf64Comparator::compare(&binary1, &binary2);
        assert!(!report.phdrs_equal);
        assert!(report.ehdrs_equal);
        assert!(report.shdrs_equal);
        assert!(report.sections_equal);
        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0].starts_with("phdr[1].p_memsz"));
    }

    #[test]
    fn phdr_count_mismatch_aborts_early() {
        let binary1 = sample_binary();
        let mut binary2 = binary1.clone();
        binary2.phdrs.pop();

        let mut findings = Vec::new();
        assert!(!Elf64Comparator::phdrs_equal(
            &binary1.phdrs,
            &binary2.phdrs,
            &mut findings
        ));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("different number of program headers"));
    }

    #[test]
    fn section_content_difference_names_the_section() {
        let binary1 = sample_binary();
        let mut binary2 = binary1.clone();
        if let Some(data) = binary2.sections[1].data.as_mut() {
            data[0] ^= 0xff;
        }

        let report = Elf64Comparator::compare(&binary1, &binary2);
        assert!(report.ehdrs_equal);
        assert!(report.phdrs_equal);
        assert!(report.shdrs_equal);
        assert!(!report.sections_equal);
        assert!(report.findings[0].contains(".text"));
    }

    #[test]
    fn size_mismatch_skips_content_compare() {
        let binary1 = sample_binary();
        let mut binary2 = binary1.clone();
        binary2.sections[1].size += 4;

        let mut findings = Vec::new();
        assert!(!Elf64Comparator::sections_equal(
            &binary1.sections,
            &binary2.sections,
            &mut findings
        ));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("section[1].size"));
    }

    #[test]
    fn nobits_pairing_rules() {
        let binary1 = sample_binary();

        // Both NOBITS (no bytes): equal.
        let mut findings = Vec::new();
        assert!(Elf64Comparator::sections_equal(
            &binary1.sections,
            &binary1.sections,
            &mut findings
        ));

        // Exactly one NOBITS: different.
        let mut binary2 = binary1.clone();
        binary2.sections[2].data = Some(vec![0u8; binary2.sections[2].size as usize]);
        let mut findings = Vec::new();
        assert!(!Elf64Comparator::sections_equal(
            &binary1.sections,
            &binary2.sections,
            &mut findings
        ));
        assert!(findings[0].contains("NOBITS"));
    }
}

//! Identifier folding.
//!
//! Declared names are CamelCase; output names are snake_case. Known acronyms
//! fold as a unit so that `UUID` becomes `uuid` rather than `u_u_i_d`.

/// Acronyms folded as whole words, keyed by their declared spelling.
const SNAKE_CASE_ACRONYMS: &[(&str, &str)] = &[
    ("IPs", "ips"),
    ("IPv6", "ipv6"),
    ("IPv4", "ipv4"),
    ("DNS", "dns"),
    ("DHCP", "dhcp"),
    ("MAC", "mac"),
    ("UUID", "uuid"),
    ("XML", "xml"),
    ("HTTP", "http"),
    ("HTTPS", "https"),
    ("API", "api"),
    ("URI", "uri"),
    ("URL", "url"),
    ("VLAN", "vlan"),
    ("MTU", "mtu"),
    ("TFTP", "tftp"),
    ("NFS", "nfs"),
    ("SCSI", "scsi"),
    ("SATA", "sata"),
    ("IDE", "ide"),
    ("USB", "usb"),
    ("PCI", "pci"),
    ("VNC", "vnc"),
    ("RDP", "rdp"),
    ("VGA", "vga"),
    ("CPU", "cpu"),
    ("VCPU", "vcpu"),
    ("RAM", "ram"),
    ("ROM", "rom"),
    ("BIOS", "bios"),
    ("UEFI", "uefi"),
    ("TPM", "tpm"),
    ("RNG", "rng"),
    ("WWN", "wwn"),
];

fn acronym(s: &str) -> Option<&'static str> {
    SNAKE_CASE_ACRONYMS
        .iter()
        .find(|(declared, _)| *declared == s)
        .map(|(_, folded)| *folded)
}

/// Converts a CamelCase identifier to snake_case, keeping known acronyms intact.
///
/// A name that is exactly a known acronym, or a known acronym followed by a
/// plural `s`, folds as a single word.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    if let Some(folded) = s.strip_suffix('s').and_then(acronym) {
        return format!("{folded}s");
    }

    if let Some(folded) = acronym(s) {
        return folded.to_string();
    }

    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());

            // Break on a lower→upper edge, or before the last capital of a run
            // that starts a new word ("CPUSet" → "cpu_set").
            if prev.is_lowercase() || (prev.is_uppercase() && next_lower && i > 1) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

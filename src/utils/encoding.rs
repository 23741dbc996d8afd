use encoding_rs::{UTF_8, WINDOWS_1250};

/// Decode exported sheet text.
///
/// Exports are either UTF-8 (optionally with BOM) or the Central European
/// Windows code page used by Polish Excel installs.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, _) = WINDOWS_1250.decode(bytes);
    text.into_owned()
}

/// Pick the field delimiter from the first non-empty line.
///
/// Semicolons win when they outnumber commas, which is what Polish locale
/// exports produce since the comma is the decimal separator.
pub fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().find(|line| !line.trim().is_empty());

    match first_line {
        Some(line) => {
            let semicolons = line.matches(';').count();
            let commas = line.matches(',').count();
            if semicolons > commas {
                b';'
            } else {
                b','
            }
        }
        None => b',',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let bytes = "\u{feff}Kod stacji,Miejscowość".as_bytes();
        assert_eq!(decode_text(bytes), "Kod stacji,Miejscowość");
    }

    #[test]
    fn test_decode_windows_1250_fallback() {
        // "Miejscowość" in CP1250: ś = 0x9C, ć = 0xE6
        let bytes = b"Miejscowo\x9c\xe6";
        assert_eq!(decode_text(bytes), "Miejscowość");
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("Kod stacji;ST01;ST02\n"), b';');
        assert_eq!(sniff_delimiter("Kod stacji,ST01,ST02\n"), b',');
        assert_eq!(sniff_delimiter("\n\nDatetime;10,5;20\n"), b';');
        assert_eq!(sniff_delimiter(""), b',');
    }
}

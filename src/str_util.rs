use std::fmt::{self, Write};
use unicode_general_category::{get_general_category, GeneralCategory};

use bstr::ByteSlice;

/// Formats `s` as a Guayavita string literal that reads back to the same
/// value. Invalid UTF-8 bytes are written as `\xXX`.
pub fn inspect_str(s: &[u8]) -> StringInspector<'_> {
    StringInspector(s)
}

pub struct StringInspector<'a>(&'a [u8]);

impl<'a> fmt::Display for StringInspector<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for chunk in ByteSlice::utf8_chunks(self.0) {
            for ch in chunk.valid().chars() {
                let esc = match ch {
                    '\n' => Some("\\n"),
                    '\r' => Some("\\r"),
                    '\t' => Some("\\t"),
                    '"' => Some("\\\""),
                    '\\' => Some("\\\\"),
                    _ => None,
                };
                if let Some(esc) = esc {
                    f.write_str(esc)?;
                } else if is_printable(ch) {
                    f.write_char(ch)?;
                } else if (ch as u32) < 0x100 {
                    write!(f, "\\x{:02X}", ch as u32)?;
                } else if (ch as u32) < 0x10000 {
                    write!(f, "\\u{:04X}", ch as u32)?;
                } else {
                    write!(f, "\\U{:08X}", ch as u32)?;
                }
            }
            for &byte in chunk.invalid() {
                write!(f, "\\x{:02X}", byte)?;
            }
        }
        f.write_str("\"")?;
        Ok(())
    }
}

fn is_printable(ch: char) -> bool {
    match get_general_category(ch) {
        GeneralCategory::UppercaseLetter
        | GeneralCategory::LowercaseLetter
        | GeneralCategory::TitlecaseLetter
        | GeneralCategory::ModifierLetter
        | GeneralCategory::OtherLetter => true,
        GeneralCategory::NonspacingMark
        | GeneralCategory::SpacingMark
        | GeneralCategory::EnclosingMark => true,
        GeneralCategory::DecimalNumber
        | GeneralCategory::LetterNumber
        | GeneralCategory::OtherNumber => true,
        GeneralCategory::ConnectorPunctuation
        | GeneralCategory::DashPunctuation
        | GeneralCategory::OpenPunctuation
        | GeneralCategory::ClosePunctuation
        | GeneralCategory::InitialPunctuation
        | GeneralCategory::FinalPunctuation
        | GeneralCategory::OtherPunctuation => true,
        GeneralCategory::MathSymbol
        | GeneralCategory::CurrencySymbol
        | GeneralCategory::ModifierSymbol
        | GeneralCategory::OtherSymbol => true,
        GeneralCategory::SpaceSeparator => ch == ' ',
        GeneralCategory::LineSeparator
        | GeneralCategory::ParagraphSeparator
        | GeneralCategory::Control
        | GeneralCategory::Format => false,
        GeneralCategory::Surrogate => unreachable!(),
        GeneralCategory::PrivateUse | GeneralCategory::Unassigned => false,
    }
}

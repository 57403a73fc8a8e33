//! Bank, branch and account code position derivation.

use iban_registry_core::{PositionSchema, Range};

/// Derives the three BBAN segment ranges of one record.
///
/// - The bank code is taken as published; an absent bank position becomes
///   the zero-width range at offset 0.
/// - An absent branch position becomes a zero-width range anchored right
///   after the bank code: the branch, if any, is part of the account number.
/// - The account code runs from the later of the two segment ends to the
///   end of the BBAN.
///
/// # Examples
///
/// ```
/// use iban_registry_core::Range;
/// use iban_registry_parser::derive_positions;
///
/// let positions = derive_positions(Some(Range::new(0, 5)), None, 23);
/// assert_eq!(positions.bank_code, Range::new(0, 5));
/// assert_eq!(positions.branch_code, Range::new(5, 5));
/// assert_eq!(positions.account_code, Range::new(5, 23));
/// ```
pub fn derive_positions(
    bank_code_position: Option<Range>,
    branch_code_position: Option<Range>,
    bban_length: usize,
) -> PositionSchema {
    let bank_code = bank_code_position.unwrap_or(Range::EMPTY);
    let branch_code = branch_code_position.unwrap_or(Range::at(bank_code.end));
    let account_code = Range::new(bank_code.end.max(branch_code.end), bban_length);

    PositionSchema {
        account_code,
        bank_code,
        branch_code,
    }
}

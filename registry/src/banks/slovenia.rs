use csv::StringRecord;

use iban_registry_core::BankRecord;

use super::{BankRegistrySource, cell};

/// Bank of Slovenia list of payment service provider identifiers.
///
/// Columns: 0 bank code, 1 name, 5 BIC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SloveniaRegistry;

impl BankRegistrySource for SloveniaRegistry {
    fn country_code(&self) -> &'static str {
        "SI"
    }

    fn record_from_row(&self, row: &StringRecord) -> BankRecord {
        BankRecord::new(
            self.country_code(),
            cell(row, 0),
            cell(row, 5).to_uppercase(),
            cell(row, 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::normalize_bank_registry;

    #[test]
    fn test_slovenia_columns() {
        let csv = "\
Identifikacijska oznaka;Naziv;Naslov;Posta;Kraj;BIC
01000;Banka Slovenije;Slovenska 35;1505;Ljubljana;bsljsi2x
 03100 ; SKB banka d.d. ;Ajdovscina 4;1513;Ljubljana; SKBASI2X
";
        let banks = normalize_bank_registry(&SloveniaRegistry, csv).unwrap();
        assert_eq!(banks.len(), 2);

        assert_eq!(banks[0].country_code, "SI");
        assert_eq!(banks[0].bank_code, "01000");
        assert_eq!(banks[0].bic, "BSLJSI2X");
        assert_eq!(banks[0].name, "Banka Slovenije");
        assert_eq!(banks[0].short_name, "Banka Slovenije");
        assert!(banks[0].primary);

        assert_eq!(banks[1].bank_code, "03100");
        assert_eq!(banks[1].name, "SKB banka d.d.");
        assert_eq!(banks[1].bic, "SKBASI2X");
    }

    #[test]
    fn test_slovenia_missing_bic_column() {
        let csv = "h0;h1\n01000;Banka Slovenije\n";
        let banks = normalize_bank_registry(&SloveniaRegistry, csv).unwrap();
        assert_eq!(banks[0].bic, "");
    }
}

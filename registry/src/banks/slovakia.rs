use csv::StringRecord;

use iban_registry_core::BankRecord;

use super::{BankRegistrySource, cell};

/// Bank codes are published without leading zeros but are four digits wide.
const BANK_CODE_WIDTH: usize = 4;

/// National Bank of Slovakia directory of payment service providers.
///
/// Columns: 0 bank code, 1 name, 2 BIC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlovakiaRegistry;

impl BankRegistrySource for SlovakiaRegistry {
    fn country_code(&self) -> &'static str {
        "SK"
    }

    fn record_from_row(&self, row: &StringRecord) -> BankRecord {
        let bank_code = format!("{:0>width$}", cell(row, 0), width = BANK_CODE_WIDTH);
        BankRecord::new(
            self.country_code(),
            bank_code,
            cell(row, 2).to_uppercase(),
            cell(row, 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::normalize_bank_registry;

    #[test]
    fn test_slovakia_pads_bank_codes() {
        let csv = "\
Kod;Nazov;BIC
200;Vseobecna uverova banka, a.s.;SUBASKBX
1111;UniCredit Bank Czech Republic and Slovakia, a.s.;unckskbx
720;Narodna banka Slovenska;
";
        let banks = normalize_bank_registry(&SlovakiaRegistry, csv).unwrap();
        assert_eq!(banks.len(), 3);
        assert_eq!(banks[0].bank_code, "0200");
        assert_eq!(banks[1].bank_code, "1111");
        assert_eq!(banks[1].bic, "UNCKSKBX");
        assert_eq!(banks[2].bank_code, "0720");
        assert_eq!(banks[2].bic, "");
        assert!(banks.iter().all(|b| b.country_code == "SK" && b.primary));
    }
}

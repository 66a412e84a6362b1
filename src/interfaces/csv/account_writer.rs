use crate::domain::account::AccountSummary;
use crate::error::Result;
use std::io::Write;

/// Writes account summaries as CSV with a `name,balance,pending_in,pending_out` header.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: Vec<AccountSummary>) -> Result<()> {
        for account in accounts {
            self.writer.serialize(account)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_accounts() {
        let mut buffer = Vec::new();
        {
            let mut writer = AccountWriter::new(&mut buffer);
            writer
                .write_accounts(vec![
                    AccountSummary {
                        name: "alice".to_string(),
                        balance: dec!(300.00),
                        pending_in: dec!(0.00),
                        pending_out: dec!(200.00),
                    },
                    AccountSummary {
                        name: "bob".to_string(),
                        balance: dec!(0.00),
                        pending_in: dec!(200.00),
                        pending_out: dec!(0.00),
                    },
                ])
                .unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "name,balance,pending_in,pending_out\nalice,300.00,0.00,200.00\nbob,0.00,200.00,0.00\n"
        );
    }
}

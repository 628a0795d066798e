use crate::domain::payment::Payment;
use crate::error::Result;
use std::io::Write;

/// Writes payments as CSV with a header row, for human or tool consumption.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments(&mut self, payments: &[Payment]) -> Result<()> {
        if payments.is_empty() {
            self.writer
                .write_record(["id", "account_id", "amount", "category", "status"])?;
        }
        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

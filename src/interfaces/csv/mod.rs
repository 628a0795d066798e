pub mod dump;
pub mod payment_writer;

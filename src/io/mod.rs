mod records;

pub use records::RecordReader;

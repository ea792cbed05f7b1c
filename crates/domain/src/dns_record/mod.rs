pub mod answer;
pub mod record;
pub mod record_set;
pub mod record_type;

pub use answer::{AnswerData, AnswerRecord, RawAnswer};
pub use record::Record;
pub use record_set::{RecordSet, RecordSetBuilder};
pub use record_type::RecordType;

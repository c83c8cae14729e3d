pub mod cutoff;
pub mod error;
pub mod fhir;
pub mod problem;
pub mod record_type;
pub mod relationship;

pub use cutoff::{CUTOFF_COLUMNS, CUTOFF_TIME_FORMAT, CutoffRecord, LabelValue};
pub use error::{ModelError, Result};
pub use problem::{PredictionType, ProblemConfig};
pub use record_type::{
    IDENTIFIER_CANDIDATES, PERIOD_TIME_INDEX, RecordType, RecordTypeFactory, RecordTypeRegistry,
    TemporalRole,
};
pub use relationship::{RelationshipCatalog, RelationshipEdge};

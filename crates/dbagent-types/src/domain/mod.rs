mod archive;
mod binlog;
mod diagnostics;
mod index;
mod stalk;

pub use archive::{ArchiveReport, OffsiteAuth, OffsiteConfig, OffsiteFile};
pub use binlog::{BinlogFile, BinlogSnapshot, LogEvent, QueryType};
pub use diagnostics::{ColumnStatistics, DbTarget, Row};
pub use index::{IndexReport, IndexedQuery, RowIdGroups, Timeline, TimelineBucket, UnindexReport};
pub use stalk::{StalkFile, StalkSummary};

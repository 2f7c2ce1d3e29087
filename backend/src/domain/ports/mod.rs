//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod report_command;
mod report_query;
mod report_repository;

#[cfg(test)]
pub use report_command::MockReportCommand;
pub use report_command::{FixtureReportCommand, ReportCommand};
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::{FixtureReportQuery, ReportQuery};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{FixtureReportRepository, ReportRepository, ReportRepositoryError};
